//! Fixed-tick game session loop
//!
//! A [`GameSession`] owns the simulation state for one run. It ticks at the
//! simulation rate, drains the input channel, advances the state, paints the
//! visible tunnel slice, and publishes the frame on a watch channel for the
//! hosting view. The loop stops on a terminal phase, on an explicit quit, or
//! when the hosting view drops its handle.

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::render::{paint, Surface};
use crate::util::time::tick_duration;

use super::geometry::{SharedGeometry, TunnelGeometry};
use super::sim::{Phase, Simulation};
use super::{InputEvent, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Capacity of the player input channel
const INPUT_CHANNEL_CAPACITY: usize = 64;

/// One published frame of session output
#[derive(Debug, Clone)]
pub struct Frame {
    pub surface: Surface,
    pub score: f64,
    pub scroll_speed: f64,
    pub phase: Phase,
}

/// Handle held by the hosting view
pub struct SessionHandle {
    pub input_tx: mpsc::Sender<InputEvent>,
    pub frames: watch::Receiver<Frame>,
}

/// Final state of a finished session
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    pub phase: Phase,
    pub score: u64,
}

/// Session setup errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Tunnel geometry is empty or still streaming; cannot start a run")]
    GeometryNotReady,
}

/// One game run over a fully streamed tunnel
pub struct GameSession {
    sim: Simulation,
    geometry: SharedGeometry,
    input_rx: mpsc::Receiver<InputEvent>,
    frame_tx: watch::Sender<Frame>,
}

impl GameSession {
    /// Create a session over a frozen, non-empty geometry.
    ///
    /// Starting on an incomplete geometry would make the win condition a
    /// moving target and the leading segment a hole, so both are rejected
    /// up front.
    pub fn new(
        geometry: SharedGeometry,
        complexity: u32,
    ) -> Result<(Self, SessionHandle), SessionError> {
        {
            let geo = geometry.read();
            if geo.is_empty() || !geo.is_complete() {
                return Err(SessionError::GeometryNotReady);
            }
        }

        let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);

        let sim = Simulation::new(complexity);
        let initial = render_frame(&sim, &geometry);
        let (frame_tx, frames) = watch::channel(initial);

        let session = Self {
            sim,
            geometry,
            input_rx,
            frame_tx,
        };
        let handle = SessionHandle { input_tx, frames };

        Ok((session, handle))
    }

    /// Run the fixed-tick loop to completion
    pub async fn run(mut self) -> SessionSummary {
        info!("Game session started");

        let mut ticker = interval(tick_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        'game: loop {
            ticker.tick().await;

            // Drain all pending input before advancing.
            loop {
                match self.input_rx.try_recv() {
                    Ok(InputEvent::Quit) => {
                        info!("Session abandoned by the player");
                        break 'game;
                    }
                    Ok(event) => self.sim.apply(event),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        debug!("Input channel closed, stopping session");
                        break 'game;
                    }
                }
            }

            {
                let geometry = self.geometry.read();
                self.sim.advance(&geometry);
            }

            let _ = self.frame_tx.send(render_frame(&self.sim, &self.geometry));

            match self.sim.phase {
                Phase::Won => {
                    info!(score = self.sim.score.round(), "Tunnel cleared");
                    break;
                }
                Phase::Lost => {
                    info!(
                        offset_y = self.sim.offset_y,
                        "The drone hit the wall"
                    );
                    break;
                }
                _ => {}
            }
        }

        SessionSummary {
            phase: self.sim.phase,
            score: self.sim.score.round() as u64,
        }
    }
}

/// Paint the current visible slice into a fresh frame
fn render_frame(sim: &Simulation, geometry: &SharedGeometry) -> Frame {
    let mut surface = Surface::new(CANVAS_WIDTH as usize, CANVAS_HEIGHT as usize);
    {
        let geo = geometry.read();
        paint(
            &mut surface,
            geo.visible_window(sim.offset_y),
            TunnelGeometry::sub_offset(sim.offset_y),
            sim.drone_x,
        );
    }
    Frame {
        surface,
        score: sim.score,
        scroll_speed: sim.scroll_speed,
        phase: sim.phase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WallSegment;

    fn shared_corridor(count: usize, frozen: bool) -> SharedGeometry {
        let geometry = TunnelGeometry::shared();
        {
            let mut geo = geometry.write();
            for _ in 0..count {
                geo.push(WallSegment {
                    left: -200.0,
                    right: 200.0,
                });
            }
            if frozen {
                geo.freeze();
            }
        }
        geometry
    }

    #[test]
    fn rejects_empty_or_streaming_geometry() {
        assert!(matches!(
            GameSession::new(shared_corridor(0, true), 1),
            Err(SessionError::GeometryNotReady)
        ));
        assert!(matches!(
            GameSession::new(shared_corridor(50, false), 1),
            Err(SessionError::GeometryNotReady)
        ));
        assert!(GameSession::new(shared_corridor(50, true), 1).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_a_win_at_full_speed() {
        let geometry = shared_corridor(50, true);
        let (session, handle) = GameSession::new(geometry, 10).unwrap();
        let task = tokio::spawn(session.run());

        for _ in 0..100 {
            if handle.input_tx.send(InputEvent::SpeedUp).await.is_err() {
                break;
            }
        }

        let summary = task.await.unwrap();
        assert_eq!(summary.phase, Phase::Won);
        assert!(summary.score > 0);

        let frame = handle.frames.borrow();
        assert_eq!(frame.phase, Phase::Won);
    }

    #[tokio::test(start_paused = true)]
    async fn quitting_ends_the_session() {
        let (session, handle) = GameSession::new(shared_corridor(50, true), 1).unwrap();
        let task = tokio::spawn(session.run());

        handle.input_tx.send(InputEvent::Quit).await.unwrap();

        let summary = task.await.unwrap();
        assert!(!summary.phase.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_loop() {
        let (session, handle) = GameSession::new(shared_corridor(50, true), 1).unwrap();
        let task = tokio::spawn(session.run());

        drop(handle);

        let summary = task.await.unwrap();
        assert_eq!(summary.phase, Phase::NotStarted);
        assert_eq!(summary.score, 0);
    }
}
