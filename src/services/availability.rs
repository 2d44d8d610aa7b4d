//! Room availability checks

use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{error::AppResult, repository::ReservationStore};

/// Answers whether a room is free over a closed date interval
#[derive(Clone)]
pub struct AvailabilityChecker {
    reservations: Arc<dyn ReservationStore>,
}

impl AvailabilityChecker {
    pub fn new(reservations: Arc<dyn ReservationStore>) -> Self {
        Self { reservations }
    }

    /// A room is available when no CONFIRMED reservation of it, other than
    /// `exclude_id`, satisfies `r.start <= end && r.end >= start`.
    pub async fn is_available(
        &self,
        room_number: i32,
        start: NaiveDate,
        end: NaiveDate,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        let overlapping = self
            .reservations
            .count_overlapping(room_number, start, end, exclude_id)
            .await?;

        tracing::debug!(
            "Room {} from {} to {} (excluding {:?}): {} overlapping reservations",
            room_number, start, end, exclude_id, overlapping
        );

        Ok(overlapping == 0)
    }
}

type RoomTable = Arc<SyncMutex<HashMap<i32, Arc<Mutex<()>>>>>;

/// Per-room async locks serializing availability check and write.
///
/// A room's entry only lives while some caller holds or awaits its lock.
#[derive(Clone, Default)]
pub struct RoomLocks {
    rooms: RoomTable,
}

impl RoomLocks {
    /// Wait for exclusive access to `room_number`; released when the guard drops
    pub async fn lock(&self, room_number: i32) -> RoomGuard {
        let room = {
            let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
            rooms.entry(room_number).or_default().clone()
        };

        // Built before waiting so a caller dropped mid-wait still cleans up
        let mut held = RoomGuard {
            rooms: self.rooms.clone(),
            room_number,
            room: room.clone(),
            guard: None,
        };
        held.guard = Some(room.lock_owned().await);
        held
    }

    /// Number of rooms currently tracked
    pub fn len(&self) -> usize {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one room, see [`RoomLocks::lock`]
pub struct RoomGuard {
    rooms: RoomTable,
    room_number: i32,
    room: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        self.guard.take();

        let mut rooms = self.rooms.lock().unwrap_or_else(PoisonError::into_inner);
        // Table entry plus our own handle: nobody else holds or waits for it
        if Arc::strong_count(&self.room) == 2 {
            rooms.remove(&self.room_number);
        }
    }
}
