use tankyard_common::ConfigError;
use tankyard_physics::PhysicsError;
use tankyard_player::PlayerError;
use tankyard_render::SceneError;

/// Session-level failures.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Startup could not complete; the session should be abandoned.
    #[error("setup failed: {0}")]
    Setup(String),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("no player with number {0}")]
    UnknownPlayer(i32),
}

impl From<PlayerError> for GameError {
    fn from(e: PlayerError) -> Self {
        match e {
            PlayerError::Physics(e) => Self::Physics(e),
            PlayerError::Scene(e) => Self::Scene(e),
        }
    }
}

impl GameError {
    /// Whether the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Setup(_) | Self::Config(_) | Self::Physics(PhysicsError::ResourceExhausted { .. })
        )
    }
}
