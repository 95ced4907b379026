pub const REFERENCE_POSES: &str = "reference_poses";
