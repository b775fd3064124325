pub mod manager;

pub use manager::{HandTakenOutcome, Joined, Room, RoomError, RoomManager};
