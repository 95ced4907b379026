use crate::landmark::{Joint, Landmark, LandmarkScheme, LandmarkSet};

const STANDING: [(Joint, f64, f64); 12] = [
    (Joint::LeftShoulder, 0.60, 0.30),
    (Joint::RightShoulder, 0.40, 0.30),
    (Joint::LeftElbow, 0.65, 0.45),
    (Joint::RightElbow, 0.35, 0.45),
    (Joint::LeftWrist, 0.62, 0.60),
    (Joint::RightWrist, 0.38, 0.60),
    (Joint::LeftHip, 0.56, 0.60),
    (Joint::RightHip, 0.44, 0.60),
    (Joint::LeftKnee, 0.57, 0.78),
    (Joint::RightKnee, 0.43, 0.78),
    (Joint::LeftAnkle, 0.57, 0.95),
    (Joint::RightAnkle, 0.43, 0.95),
];

/// 站立姿态，未列出的关键点放在头部附近
pub fn standing_pose(scheme: LandmarkScheme) -> LandmarkSet {
    let mut points = vec![Landmark::new(0.5, 0.15, 0.0); scheme.len()];
    for (joint, x, y) in STANDING {
        points[scheme.index_of(joint)] = Landmark::new(x, y, 0.0);
    }
    LandmarkSet::new(scheme, points).expect("standing pose fixture")
}

/// 将某个关节平移后的新姿态
pub fn shifted(set: &LandmarkSet, joint: Joint, dx: f64, dy: f64) -> LandmarkSet {
    let mut points = set.landmarks().to_vec();
    let index = set.scheme().index_of(joint);
    points[index].x += dx;
    points[index].y += dy;
    LandmarkSet::new(set.scheme(), points).expect("shifted pose fixture")
}
