//! Application wiring: one full game session from acquisition to scoreboard

use tracing::{error, info, warn};

use crate::config::Config;
use crate::game::{GameSession, Phase, SharedGeometry, TunnelGeometry};
use crate::net::{acquire, AcquiredTunnel, ApiClient};
use crate::score::Scoreboard;
use crate::term;
use crate::ws::protocol::session_hello;
use crate::ws::{CoordinateStream, StreamEvent};

/// Owned services for one program run
pub struct App {
    config: Config,
    api: ApiClient,
    scoreboard: Scoreboard,
}

impl App {
    pub fn new(config: Config) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        let scoreboard = Scoreboard::new(config.scoreboard_path.clone());
        Self {
            config,
            api,
            scoreboard,
        }
    }

    /// Acquire a tunnel, play one session, record the outcome
    pub async fn run(&self) -> anyhow::Result<()> {
        let tunnel = acquire(
            &self.api,
            &self.config.player_name,
            self.config.complexity,
        )
        .await?;

        info!("Building the map...");
        let geometry = self.build_geometry(&tunnel).await?;

        let (session, handle) = GameSession::new(geometry, self.config.complexity)?;
        let session_task = tokio::spawn(session.run());

        term::run(handle).await?;
        let summary = session_task.await?;

        match summary.phase {
            Phase::Won => {
                info!(score = summary.score, "You won");
                let improved = self.scoreboard.record_win(
                    &self.config.player_name,
                    self.config.complexity,
                    summary.score,
                )?;
                if !improved {
                    info!("Previous best score stands");
                }
            }
            Phase::Lost => {
                info!(score = summary.score, "You lost, the drone touched the wall");
            }
            _ => {
                warn!("Session abandoned before the run ended");
            }
        }

        for record in self.scoreboard.load()? {
            info!(
                player = %record.player_id,
                complexity = record.complexity,
                score = record.score,
                "Best score"
            );
        }

        Ok(())
    }

    /// Stream the tunnel geometry until the finished sentinel.
    ///
    /// On any stream failure the partially built geometry is dropped with
    /// the error; a session never starts on an unfrozen store.
    async fn build_geometry(&self, tunnel: &AcquiredTunnel) -> anyhow::Result<SharedGeometry> {
        let mut stream = CoordinateStream::new();
        let mut events = stream.connect(&self.config.cave_stream_url()).await?;

        let geometry = TunnelGeometry::shared();
        let mut outcome: anyhow::Result<()> = Ok(());

        loop {
            let Some(event) = events.recv().await else {
                outcome = Err(anyhow::anyhow!(
                    "coordinate stream closed before the finished sentinel"
                ));
                break;
            };

            match event {
                StreamEvent::Ready => {
                    let hello = session_hello(&tunnel.session_id, &tunnel.descriptor);
                    if let Err(e) = stream.send(hello).await {
                        outcome = Err(e.into());
                        break;
                    }
                }
                StreamEvent::Segment(segment) => {
                    geometry.write().push(segment);
                }
                StreamEvent::Finished => {
                    geometry.write().freeze();
                    break;
                }
                StreamEvent::Error(e) => {
                    error!(error = %e, "Coordinate stream failed");
                    outcome = Err(e.into());
                    break;
                }
            }
        }

        stream.disconnect().await;
        outcome?;

        info!(segments = geometry.read().len(), "Tunnel geometry complete");
        Ok(geometry)
    }
}
