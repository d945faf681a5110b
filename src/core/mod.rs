pub mod config;
pub mod error;
pub mod types;

pub use error::{EngineError, Result};
pub use types::{
    Facility, Gender, GuildRank, LocationId, LogCategory, RunId, Stage, StoryFlag, TownKind,
};
