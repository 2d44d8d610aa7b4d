//! Data models for the hotel server

pub mod client;
pub mod reservation;

// Re-export commonly used types
pub use client::{Client, ClientDetails, NewClient};
pub use reservation::{
    NewReservation, Reservation, ReservationDetails, ReservationRequest, ReservationState,
};
