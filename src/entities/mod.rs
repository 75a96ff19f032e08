pub mod admins;
pub mod events;
pub mod participants;
pub mod winners;

pub use admins as admin_entity;
pub use events as event_entity;
pub use events::EventStatus;
pub use participants as participant_entity;
pub use winners as winner_entity;
