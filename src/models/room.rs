//! Room and room registry models.
//!
//! Rooms are created and removed by an external registry. The engine only
//! reads them to label results and to detect rooms without a meter reading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Identifier of a room in the shared house.
pub type RoomId = u64;

/// A room known to the room registry.
///
/// # Example
///
/// ```
/// use allocation_engine::models::Room;
///
/// let room = Room {
///     id: 101,
///     name: "Room 101".to_string(),
/// };
/// assert_eq!(room.id, 101);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique, immutable room identifier.
    pub id: RoomId,
    /// Display name used when labelling results.
    pub name: String,
}

/// Read-only snapshot of the room registry.
///
/// Rooms are kept ordered by id so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Builds a registry from a list of rooms.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRoom` if two rooms share an id.
    ///
    /// # Example
    ///
    /// ```
    /// use allocation_engine::models::{Room, RoomRegistry};
    ///
    /// let registry = RoomRegistry::new(vec![
    ///     Room { id: 2, name: "Upstairs".to_string() },
    ///     Room { id: 1, name: "Downstairs".to_string() },
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1, 2]);
    /// assert_eq!(registry.name_of(2), "Upstairs");
    /// assert_eq!(registry.name_of(9), "Room 9");
    /// ```
    pub fn new(rooms: Vec<Room>) -> EngineResult<Self> {
        let mut by_id = BTreeMap::new();
        for room in rooms {
            let id = room.id;
            if by_id.insert(id, room).is_some() {
                return Err(EngineError::DuplicateRoom { room_id: id });
            }
        }
        Ok(Self { rooms: by_id })
    }

    /// Returns an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if the registry knows no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Returns the number of registered rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if the room is registered.
    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    /// Returns the registered room ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.rooms.keys().copied()
    }

    /// Returns the registered rooms in ascending id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Returns the room name, or `Room <id>` for unregistered rooms.
    pub fn name_of(&self, id: RoomId) -> String {
        self.rooms
            .get(&id)
            .map(|room| room.name.clone())
            .unwrap_or_else(|| format!("Room {}", id))
    }
}
