use super::*;

#[test]
fn affected_outputs_set_ops() {
    let mut s = AffectedOutputs::NONE;
    assert!(s.is_empty());
    s.insert(ImageOutput::ChannelData);
    assert!(s.contains(ImageOutput::ChannelData));
    assert!(!s.contains(ImageOutput::Format));

    let u = s.union(AffectedOutputs::of(&[ImageOutput::Format]));
    assert_eq!(
        u.iter().collect::<Vec<_>>(),
        vec![ImageOutput::Format, ImageOutput::ChannelData]
    );
    assert_eq!(AffectedOutputs::ALL.iter().count(), 4);
}
