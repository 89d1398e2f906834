use stitchprep_core::error::StitchError;
use stitchprep_core::resolution::{estimate_downsample, VoxelResolution};

fn res(x: f64, y: f64, z: f64) -> VoxelResolution {
    VoxelResolution::new(x, y, z).unwrap()
}

#[test]
fn test_double_resolution_is_level_one() {
    assert_eq!(
        estimate_downsample(res(1.8, 1.8, 2.0), res(3.6, 3.6, 4.0)).unwrap(),
        1
    );
}

#[test]
fn test_quadruple_resolution_is_level_two() {
    assert_eq!(
        estimate_downsample(res(0.19, 0.19, 0.85), res(0.76, 0.76, 3.4)).unwrap(),
        2
    );
}

#[test]
fn test_identical_resolution_is_level_zero() {
    assert_eq!(
        estimate_downsample(res(0.5, 0.5, 2.0), res(0.5, 0.5, 2.0)).unwrap(),
        0
    );
}

#[test]
fn test_level_is_maximum_across_axes() {
    // ratios 2, 2, 8 -> levels 1, 1, 3
    assert_eq!(
        estimate_downsample(res(1.0, 1.0, 1.0), res(2.0, 2.0, 8.0)).unwrap(),
        3
    );
    // ratios 5.5, 1, 1 -> levels 2, 0, 0
    assert_eq!(
        estimate_downsample(res(0.2, 1.0, 1.0), res(1.1, 1.0, 1.0)).unwrap(),
        2
    );
}

#[test]
fn test_finer_target_is_rejected() {
    let err = estimate_downsample(res(0.19, 0.19, 0.85), res(0.76, 0.76, 0.5)).unwrap_err();
    match err {
        StitchError::MalformedResolution {
            axis,
            voxel,
            target,
        } => {
            assert_eq!(axis, 'z');
            assert_eq!(voxel, 0.85);
            assert_eq!(target, 0.5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_finer_target_on_first_axis_is_rejected() {
    let err = estimate_downsample(res(1.0, 1.0, 1.0), res(0.9, 4.0, 4.0)).unwrap_err();
    assert!(matches!(err, StitchError::MalformedResolution { axis: 'x', .. }));
}

#[test]
fn test_resolution_deserializes_from_array() {
    let r: VoxelResolution = serde_json::from_str("[0.19, 0.19, 0.85]").unwrap();
    assert_eq!(r.to_array(), [0.19, 0.19, 0.85]);
    assert!(serde_json::from_str::<VoxelResolution>("[0.19, 0.0, 0.85]").is_err());
}
