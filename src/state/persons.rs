//! Showman and player roster with readiness and transient speech.
//!
//! Players are kept in seat order; the name is only a lookup key. Updates
//! that address an unknown name are ignored because the person may have
//! left between the event being emitted and processed.

use indexmap::IndexMap;
use serde::Serialize;

/// Host of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Showman {
    /// Unique name.
    pub name: String,
    /// Ready flag.
    pub is_ready: bool,
    /// Last thing said, cleared on stage change.
    pub replic: Option<String>,
}

/// Contestant sitting at a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Unique name.
    pub name: String,
    /// Ready flag.
    pub is_ready: bool,
    /// Last thing said, cleared on stage change.
    pub replic: Option<String>,
    /// Score.
    pub sum: i32,
    /// Stake made in the current auction, if any.
    pub stake: Option<i32>,
    /// This player must make the pending decision.
    pub is_deciding: bool,
}

/// Role-specific part of a person announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonKind {
    /// Fill the showman slot.
    Showman,
    /// Take (or keep) a player seat.
    Player {
        /// Score.
        sum: i32,
        /// Current stake.
        stake: Option<i32>,
        /// Deciding flag.
        is_deciding: bool,
    },
}

/// Attributes carried by a person upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonAttrs {
    /// Ready flag.
    pub is_ready: bool,
    /// Showman or player data.
    pub kind: PersonKind,
}

/// Every person taking part in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Persons {
    /// Singleton showman slot.
    pub showman: Option<Showman>,
    /// Players keyed by name, iterated in seat order.
    pub players: IndexMap<String, Player>,
}

impl Persons {
    /// Replace the whole roster, seating players in the given order.
    pub fn replace_roster(&mut self, people: Vec<(String, PersonAttrs)>) {
        *self = Self::default();
        for (name, attrs) in people {
            self.upsert(name, attrs);
        }
    }

    /// Insert or replace a person. A replaced player keeps its seat.
    pub fn upsert(&mut self, name: String, attrs: PersonAttrs) {
        match attrs.kind {
            PersonKind::Showman => {
                self.players.shift_remove(&name);
                self.showman = Some(Showman {
                    name,
                    is_ready: attrs.is_ready,
                    replic: None,
                });
            }
            PersonKind::Player {
                sum,
                stake,
                is_deciding,
            } => {
                if self.is_showman(&name) {
                    self.showman = None;
                }
                let player = Player {
                    name: name.clone(),
                    is_ready: attrs.is_ready,
                    replic: None,
                    sum,
                    stake,
                    is_deciding,
                };
                self.players.insert(name, player);
            }
        }
    }

    /// Remove a person. Returns whether someone was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.is_showman(name) {
            self.showman = None;
            return true;
        }
        self.players.shift_remove(name).is_some()
    }

    /// Update a ready flag. Returns whether the person exists.
    pub fn set_ready(&mut self, name: &str, is_ready: bool) -> bool {
        if let Some(showman) = self.showman.as_mut().filter(|s| s.name == name) {
            showman.is_ready = is_ready;
            return true;
        }
        match self.players.get_mut(name) {
            Some(player) => {
                player.is_ready = is_ready;
                true
            }
            None => false,
        }
    }

    /// Record what a person just said. Returns whether the person exists.
    pub fn set_replic(&mut self, name: &str, text: String) -> bool {
        if let Some(showman) = self.showman.as_mut().filter(|s| s.name == name) {
            showman.replic = Some(text);
            return true;
        }
        match self.players.get_mut(name) {
            Some(player) => {
                player.replic = Some(text);
                true
            }
            None => false,
        }
    }

    /// Update a player's score. Returns whether the player exists.
    pub fn set_sum(&mut self, name: &str, sum: i32) -> bool {
        match self.players.get_mut(name) {
            Some(player) => {
                player.sum = sum;
                true
            }
            None => false,
        }
    }

    /// Drop every transient replic.
    pub fn clear_replics(&mut self) {
        if let Some(showman) = self.showman.as_mut() {
            showman.replic = None;
        }
        for player in self.players.values_mut() {
            player.replic = None;
        }
    }

    /// Mark `decider` as the only deciding player, or clear every mark.
    pub fn mark_deciding(&mut self, decider: Option<&str>) {
        for player in self.players.values_mut() {
            player.is_deciding = decider == Some(player.name.as_str());
        }
    }

    /// Seat index of a player.
    pub fn seat_of(&self, name: &str) -> Option<usize> {
        self.players.get_index_of(name)
    }

    /// Player sitting at `seat`.
    pub fn player_at(&self, seat: usize) -> Option<&Player> {
        self.players.get_index(seat).map(|(_, player)| player)
    }

    /// Whether `name` refers to anyone in the session.
    pub fn contains(&self, name: &str) -> bool {
        self.is_showman(name) || self.players.contains_key(name)
    }

    fn is_showman(&self, name: &str) -> bool {
        self.showman.as_ref().is_some_and(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(sum: i32) -> PersonAttrs {
        PersonAttrs {
            is_ready: false,
            kind: PersonKind::Player {
                sum,
                stake: None,
                is_deciding: false,
            },
        }
    }

    fn showman() -> PersonAttrs {
        PersonAttrs {
            is_ready: true,
            kind: PersonKind::Showman,
        }
    }

    fn seated(persons: &Persons) -> Vec<&str> {
        persons.players.keys().map(String::as_str).collect()
    }

    #[test]
    fn roster_keeps_seat_order() {
        let mut persons = Persons::default();
        persons.replace_roster(vec![
            ("Host".into(), showman()),
            ("Alice".into(), player(0)),
            ("Bob".into(), player(0)),
            ("Carl".into(), player(0)),
        ]);

        assert_eq!(persons.showman.as_ref().unwrap().name, "Host");
        assert_eq!(seated(&persons), ["Alice", "Bob", "Carl"]);
        assert_eq!(persons.seat_of("Bob"), Some(1));
        assert_eq!(persons.player_at(2).unwrap().name, "Carl");
    }

    #[test]
    fn replacing_a_player_preserves_seat() {
        let mut persons = Persons::default();
        for name in ["Alice", "Bob", "Carl"] {
            persons.upsert(name.into(), player(0));
        }
        persons.upsert("Alice".into(), player(300));
        persons.set_ready("Bob", true);
        persons.set_sum("Carl", -100);

        assert_eq!(seated(&persons), ["Alice", "Bob", "Carl"]);
        assert_eq!(persons.players["Alice"].sum, 300);
        assert!(persons.players["Bob"].is_ready);
        assert_eq!(persons.players["Carl"].sum, -100);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut persons = Persons::default();
        persons.upsert("Carl".into(), player(0));
        assert!(persons.remove("Carl"));

        let before = persons.clone();
        assert!(!persons.set_ready("Carl", true));
        assert!(!persons.set_replic("Carl", "hello".into()));
        assert!(!persons.set_sum("Carl", 10));
        assert!(!persons.remove("Carl"));
        assert_eq!(persons, before);
    }

    #[test]
    fn removing_a_player_keeps_remaining_order() {
        let mut persons = Persons::default();
        for name in ["Alice", "Bob", "Carl"] {
            persons.upsert(name.into(), player(0));
        }
        persons.remove("Bob");
        assert_eq!(seated(&persons), ["Alice", "Carl"]);
    }

    #[test]
    fn person_can_switch_between_showman_and_player() {
        let mut persons = Persons::default();
        persons.upsert("Alice".into(), player(0));
        persons.upsert("Alice".into(), showman());
        assert!(persons.players.is_empty());
        assert_eq!(persons.showman.as_ref().unwrap().name, "Alice");

        persons.upsert("Alice".into(), player(0));
        assert!(persons.showman.is_none());
        assert!(persons.contains("Alice"));
    }

    #[test]
    fn replics_and_deciding_marks() {
        let mut persons = Persons::default();
        persons.upsert("Host".into(), showman());
        persons.upsert("Alice".into(), player(0));
        persons.upsert("Bob".into(), player(0));

        persons.set_replic("Host", "Choose a question".into());
        persons.set_replic("Alice", "Movies for 200".into());
        persons.mark_deciding(Some("Bob"));
        assert!(persons.players["Bob"].is_deciding);
        assert!(!persons.players["Alice"].is_deciding);

        persons.clear_replics();
        persons.mark_deciding(None);
        assert!(persons.showman.as_ref().unwrap().replic.is_none());
        assert!(persons.players.values().all(|p| p.replic.is_none() && !p.is_deciding));
    }
}
