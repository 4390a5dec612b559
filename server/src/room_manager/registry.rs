//! Identity registry: owns every live room plus the session -> room index.
//!
//! A session maps to at most one room at a time. Bindings are created on
//! admission and removed on confirmed departure (explicit leave or
//! grace-period expiry), never on mere disconnect.

use std::collections::HashMap;

use crate::room_manager::room::Room;

#[derive(Default)]
pub struct Registry {
    rooms: HashMap<String, Room>,
    session_to_room: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, session_id: String, room_id: String) {
        self.session_to_room.insert(session_id, room_id);
    }

    pub fn unbind(&mut self, session_id: &str) {
        self.session_to_room.remove(session_id);
    }

    pub fn room_id_for(&self, session_id: &str) -> Option<&str> {
        self.session_to_room.get(session_id).map(String::as_str)
    }

    /// Room the session is bound to, if any.
    pub fn lookup(&mut self, session_id: &str) -> Option<&mut Room> {
        let room_id = self.session_to_room.get(session_id)?;
        self.rooms.get_mut(room_id)
    }

    /// Like `lookup`, but only when the claimed room id matches the
    /// session's binding. Rejects forged or stale room identifiers.
    pub fn lookup_strict(&mut self, session_id: &str, room_id: &str) -> Option<&mut Room> {
        if self.session_to_room.get(session_id).map(String::as_str) != Some(room_id) {
            return None;
        }
        self.rooms.get_mut(room_id)
    }

    pub fn insert_room(&mut self, room: Room) {
        self.rooms.insert(room.room_id.clone(), room);
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_by_id(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_by_id_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    pub fn remove_room(&mut self, room_id: &str) {
        self.rooms.remove(room_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_lookup_rejects_forged_room_ids() {
        let mut registry = Registry::new();
        let room = Room::new(3);
        let room_id = room.room_id.clone();
        let other = Room::new(3);
        let other_id = other.room_id.clone();
        registry.insert_room(room);
        registry.insert_room(other);
        registry.bind("session-a".into(), room_id.clone());

        assert!(registry.lookup_strict("session-a", &room_id).is_some());
        assert!(registry.lookup_strict("session-a", &other_id).is_none());
        assert!(registry.lookup_strict("session-b", &room_id).is_none());
    }

    #[test]
    fn unbound_sessions_resolve_to_nothing() {
        let mut registry = Registry::new();
        let room = Room::new(1);
        let room_id = room.room_id.clone();
        registry.insert_room(room);
        registry.bind("session-a".into(), room_id.clone());

        assert!(registry.lookup("session-a").is_some());
        registry.unbind("session-a");
        assert!(registry.lookup("session-a").is_none());
        assert!(registry.room_id_for("session-a").is_none());
    }

    #[test]
    fn removed_rooms_no_longer_resolve_by_code() {
        let mut registry = Registry::new();
        let room = Room::new(1);
        let room_id = room.room_id.clone();
        registry.insert_room(room);
        assert!(registry.contains_room(&room_id));

        registry.remove_room(&room_id);
        assert!(!registry.contains_room(&room_id));
        assert!(registry.room_by_id(&room_id).is_none());
    }
}
