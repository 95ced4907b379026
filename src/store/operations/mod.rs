pub mod reference_poses;
