use crate::utils::is_step;

/// Flight-time bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirTimeState {
    /// Length of the flight in progress, 0 while grounded.
    pub current_air_time: f32,
    /// Length of the most recent completed flight.
    pub last_air_time: f32,
    /// Longest completed flight this session.
    pub best_air_time: f32,
}

/// Watches the grounded flag and times each flight from take-off to landing.
#[derive(Clone, Debug)]
pub struct AirTimeTracker {
    state: AirTimeState,
    was_grounded: bool,
}

impl Default for AirTimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AirTimeTracker {
    /// Starts out assuming the body is on the ground.
    pub fn new() -> Self {
        Self {
            state: AirTimeState::default(),
            was_grounded: true,
        }
    }

    #[inline]
    pub fn state(&self) -> &AirTimeState {
        &self.state
    }

    #[inline]
    pub fn is_airborne(&self) -> bool {
        !self.was_grounded
    }

    /// Feed one frame. Returns the finished flight's length on the landing frame.
    pub fn update(&mut self, dt: f32, is_grounded: bool) -> Option<f32> {
        if !is_step(dt) {
            return None;
        }

        let mut landed = None;
        match (self.was_grounded, is_grounded) {
            (true, false) => {
                self.state.current_air_time = dt;
            }
            (false, false) => {
                self.state.current_air_time += dt;
            }
            (false, true) => {
                let flight = self.state.current_air_time;
                self.state.last_air_time = flight;
                if flight > self.state.best_air_time {
                    self.state.best_air_time = flight;
                    log::info!("new best air time {flight:.2}s");
                }
                self.state.current_air_time = 0.0;
                landed = Some(flight);
            }
            (true, true) => {}
        }

        self.was_grounded = is_grounded;
        landed
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
