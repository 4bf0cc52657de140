use derive_more::Display;

/// Propagated state in the TEME inertial frame
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
#[display(fmt = "{{pos: {}, vel: {}}}", "position", "velocity")]
pub struct InertialState {
    /// Position [km]
    pub position: na::Vector3<f64>,

    /// Velocity [km/s]
    pub velocity: na::Vector3<f64>,
}

impl InertialState {
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        Self {
            position: position.into(),
            velocity: velocity.into(),
        }
    }

    /// Distance from the Earth's center [km]
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }
}
