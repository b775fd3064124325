//! Registry of rooms and their lifecycle.
//!
//! A [`Room`] pairs one [`GameSession`] with the [`Hub`] of sockets watching
//! it. Every mutation takes the session write lock, applies the change and
//! enqueues the resulting event before the lock is released.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use ulid::Ulid;

use crate::config::RoomPolicy;
use crate::game::{normalize_name, Card, Deck, GameError, GameSession, JoinKind, Phase, StateView};
use crate::util::id::{new_room_id, normalize_room_id};
use crate::ws::hub::{Hub, Push, PushSender, Subscription};
use crate::ws::protocol::{EventKind, RoomEvent};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("game not found")]
    NotFound,
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug)]
pub struct Joined {
    pub name: String,
    pub kind: JoinKind,
    pub view: StateView,
}

#[derive(Debug)]
pub struct HandTakenOutcome {
    pub taken_from: String,
    pub card_count: usize,
    pub view: StateView,
}

#[derive(Debug)]
struct Activity {
    last_seen: Instant,
    host_left_at: Option<Instant>,
}

#[derive(Debug)]
pub struct Room {
    id: String,
    session: RwLock<GameSession>,
    hub: Hub,
    activity: Mutex<Activity>,
}

impl Room {
    fn new(id: String, host: String) -> Self {
        Self {
            session: RwLock::new(GameSession::new(id.clone(), host)),
            id,
            hub: Hub::new(),
            activity: Mutex::new(Activity { last_seen: Instant::now(), host_left_at: None }),
        }
    }

    pub fn id(&self) -> &str { &self.id }

    pub fn hub(&self) -> &Hub { &self.hub }

    pub fn host_name(&self) -> String { self.session.read().host().to_string() }

    pub fn phase(&self) -> Phase { self.session.read().phase() }

    pub fn has_player(&self, name: &str) -> bool { self.session.read().seat_of(name).is_some() }

    pub fn view(&self, viewer: Option<&str>) -> StateView { self.session.read().view_for(viewer) }

    /// Apply one validated mutation and fan out the event it produced.
    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut GameSession) -> Result<(T, Option<EventKind>), GameError>,
    ) -> Result<T, GameError> {
        let mut session = self.session.write();
        let (value, event) = apply(&mut *session)?;
        self.touch();
        if let Some(kind) = event {
            self.broadcast(&session, kind);
        }
        Ok(value)
    }

    fn broadcast(&self, session: &GameSession, kind: EventKind) {
        let event = RoomEvent::new(kind, session);
        let delivered = self.hub.publish(&event);
        debug!(room_id = %self.id, event = event.kind.name(), delivered, "broadcast");
    }

    fn touch(&self) {
        self.activity.lock().last_seen = Instant::now();
    }

    pub fn join(&self, raw_name: &str) -> Result<Joined, GameError> {
        let name = normalize_name(raw_name)?;
        let (kind, view) = self.mutate(|session| {
            let kind = session.join(&name)?;
            let event = match kind {
                JoinKind::Joined => Some(EventKind::PlayerJoined { player_name: name.clone() }),
                JoinKind::Rejoined => None,
            };
            Ok(((kind, session.view_for(Some(&name))), event))
        })?;
        info!(room_id = %self.id, player = %name, ?kind, "player joined");
        Ok(Joined { name, kind, view })
    }

    pub fn start(&self, by: &str) -> Result<StateView, GameError> {
        self.start_with_deck(by, Deck::shuffled())
    }

    pub fn start_with_deck(&self, by: &str, deck: Deck) -> Result<StateView, GameError> {
        let view = self.mutate(|session| {
            session.start_with_deck(by, deck)?;
            Ok((session.view_for(Some(by)), Some(EventKind::GameStarted)))
        })?;
        self.activity.lock().host_left_at = None;
        info!(room_id = %self.id, players = view.players.len(), "game started");
        Ok(view)
    }

    pub fn play(&self, by: &str, card: Card) -> Result<StateView, GameError> {
        self.mutate(|session| {
            let resolution = session.play(by, card)?;
            debug!(room_id = %self.id, player = %by, %card, ?resolution, "card played");
            let event = EventKind::CardPlayed { player: by.to_string(), card };
            Ok((session.view_for(Some(by)), Some(event)))
        })
    }

    pub fn take_hand(&self, by: &str) -> Result<HandTakenOutcome, GameError> {
        self.mutate(|session| {
            let taken = session.take_hand(by)?;
            let taken_from = session.players()[taken.from].name.clone();
            info!(room_id = %self.id, player = %by, from = %taken_from, cards = taken.cards.len(), "hand taken");
            let event = EventKind::HandTaken { player: by.to_string(), taken_from: taken_from.clone() };
            let outcome = HandTakenOutcome { taken_from, card_count: taken.cards.len(), view: session.view_for(Some(by)) };
            Ok((outcome, Some(event)))
        })
    }

    pub fn play_again(&self, by: &str) -> Result<StateView, GameError> {
        let view = self.mutate(|session| {
            session.play_again(by)?;
            Ok((session.view_for(Some(by)), Some(EventKind::GameReset)))
        })?;
        self.activity.lock().host_left_at = None;
        info!(room_id = %self.id, "back to lobby");
        Ok(view)
    }

    /// Attach a socket for a seated player. The new subscriber first receives
    /// `connected`, then the whole room hears `player_reconnected`.
    pub fn connect(&self, name: &str, tx: PushSender) -> Result<Subscription, GameError> {
        let mut session = self.session.write();
        if !session.set_connected(name, true) {
            return Err(GameError::UnknownPlayer(name.to_string()));
        }
        let subscription = self.hub.attach(name, tx);
        {
            let mut activity = self.activity.lock();
            activity.last_seen = Instant::now();
            if session.is_host(name) {
                activity.host_left_at = None;
            }
        }
        self.hub.send_to(name, Push::Event(RoomEvent::new(EventKind::Connected, &session)));
        self.broadcast(&session, EventKind::PlayerReconnected { player_name: name.to_string() });
        info!(room_id = %self.id, player = %name, conn_id = %subscription.conn_id, "connected");
        Ok(subscription)
    }

    /// Detach a socket. A connection that was already replaced is ignored.
    /// A guest leaving the lobby gives up their seat.
    pub fn disconnect(&self, name: &str, conn_id: Ulid) -> bool {
        let mut session = self.session.write();
        if !self.hub.detach(name, conn_id) {
            return false;
        }
        session.set_connected(name, false);
        let kind = if session.is_host(name) && session.phase() != Phase::Playing {
            self.activity.lock().host_left_at = Some(Instant::now());
            EventKind::HostLeft { player_name: name.to_string() }
        } else {
            if session.leave(name) {
                debug!(room_id = %self.id, player = %name, "lobby seat freed");
            }
            EventKind::PlayerDisconnected { player_name: name.to_string() }
        };
        info!(room_id = %self.id, player = %name, %conn_id, event = kind.name(), "disconnected");
        self.broadcast(&session, kind);
        true
    }

    /// Whether the janitor should drop this room at `now`.
    /// A running game is never dropped for its host's absence.
    pub fn should_evict(&self, now: Instant, policy: &RoomPolicy) -> bool {
        let running = self.phase() == Phase::Playing;
        let unwatched = self.hub.is_empty();
        let activity = self.activity.lock();
        if let Some(left) = activity.host_left_at.filter(|_| !running) {
            if now.saturating_duration_since(left) >= policy.host_rejoin_grace {
                return true;
            }
        }
        unwatched && now.saturating_duration_since(activity.last_seen) >= policy.idle_ttl
    }
}

#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: DashMap<String, Arc<Room>>,
}

impl RoomManager {
    pub fn new() -> Self { Self { rooms: DashMap::new() } }

    /// Open a room with `host_name` in seat 0.
    pub fn create_room(&self, host_name: &str) -> Result<Arc<Room>, RoomError> {
        let host = normalize_name(host_name)?;
        loop {
            let id = new_room_id();
            match self.rooms.entry(id.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Arc::new(Room::new(id, host));
                    slot.insert(Arc::clone(&room));
                    info!(room_id = %room.id, host = %room.host_name(), "room created");
                    return Ok(room);
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Arc<Room>, RoomError> {
        self.rooms
            .get(&normalize_room_id(id))
            .map(|room| Arc::clone(room.value()))
            .ok_or(RoomError::NotFound)
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Room>> {
        let (_, room) = self.rooms.remove(&normalize_room_id(id))?;
        room.hub.close_all();
        Some(room)
    }

    pub fn len(&self) -> usize { self.rooms.len() }

    pub fn is_empty(&self) -> bool { self.rooms.is_empty() }

    /// Evict every room `policy` says is done. Returns how many went.
    pub fn prune(&self, now: Instant, policy: &RoomPolicy) -> usize {
        let stale: Vec<String> = self
            .rooms
            .iter()
            .filter(|entry| entry.value().should_evict(now, policy))
            .map(|entry| entry.key().clone())
            .collect();
        for id in &stale {
            if self.remove(id).is_some() {
                info!(room_id = %id, "room evicted");
            }
        }
        stale.len()
    }

    /// Sweep on `policy.sweep_interval` until the runtime shuts down.
    pub fn spawn_janitor(self: &Arc<Self>, policy: RoomPolicy) -> JoinHandle<()> {
        let rooms = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(policy.sweep_interval);
            loop {
                ticker.tick().await;
                let evicted = rooms.prune(Instant::now(), &policy);
                if evicted > 0 {
                    debug!(evicted, remaining = rooms.len(), "janitor sweep");
                }
            }
        })
    }
}
