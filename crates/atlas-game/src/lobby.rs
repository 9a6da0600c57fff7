//! Pre-game lobby: collects players until the game starts.

use atlas_protocol::{Player, PlayerId, SessionKey};

use crate::LobbyError;

/// The frozen, ordered roster a lobby produces when it locks.
///
/// Turn order is join order. The only way to get one is
/// [`Lobby::lock`], so holding a `TurnOrder` proves the roster has at
/// least the lobby's minimum number of distinct players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOrder(Vec<Player>);

impl TurnOrder {
    /// Players in turn order.
    pub fn players(&self) -> &[Player] {
        &self.0
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a locked roster holds at least two players.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_players(self) -> Vec<Player> {
        self.0
    }
}

/// Membership collector for one session before its game starts.
#[derive(Debug, Clone)]
pub struct Lobby {
    session: SessionKey,
    creator: PlayerId,
    players: Vec<Player>,
    locked: bool,
    min_players: usize,
}

impl Lobby {
    /// Creates an empty lobby that needs two players to start.
    pub fn new(session: SessionKey, creator: PlayerId) -> Self {
        Self {
            session,
            creator,
            players: Vec::new(),
            locked: false,
            min_players: 2,
        }
    }

    /// Raises the number of players needed to lock. Values below 2 are
    /// ignored.
    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players.max(2);
        self
    }

    /// Adds a player at the back of the join order.
    ///
    /// # Errors
    /// - [`LobbyError::Locked`] — the lobby has already locked
    /// - [`LobbyError::AlreadyJoined`] — `id` is already a member
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) -> Result<(), LobbyError> {
        if self.locked {
            return Err(LobbyError::Locked);
        }
        if self.contains(id) {
            return Err(LobbyError::AlreadyJoined(id));
        }
        self.players.push(Player::new(id, name));
        tracing::info!(
            session = %self.session,
            player = %id,
            players = self.players.len(),
            "player joined lobby"
        );
        Ok(())
    }

    /// Removes a player. The others keep their relative order.
    ///
    /// # Errors
    /// - [`LobbyError::Locked`] — the lobby has already locked
    /// - [`LobbyError::NotInLobby`] — `id` is not a member
    pub fn leave(&mut self, id: PlayerId) -> Result<Player, LobbyError> {
        if self.locked {
            return Err(LobbyError::Locked);
        }
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(LobbyError::NotInLobby(id))?;
        let player = self.players.remove(index);
        tracing::info!(
            session = %self.session,
            player = %id,
            players = self.players.len(),
            "player left lobby"
        );
        Ok(player)
    }

    /// Locks the lobby and hands out the roster in join order.
    ///
    /// # Errors
    /// - [`LobbyError::Locked`] — already locked once
    /// - [`LobbyError::NotEnoughPlayers`] — fewer members than the minimum;
    ///   the lobby stays open
    pub fn lock(&mut self) -> Result<TurnOrder, LobbyError> {
        if self.locked {
            return Err(LobbyError::Locked);
        }
        if self.players.len() < self.min_players {
            return Err(LobbyError::NotEnoughPlayers {
                have: self.players.len(),
                need: self.min_players,
            });
        }
        self.locked = true;
        tracing::info!(
            session = %self.session,
            players = self.players.len(),
            "lobby locked"
        );
        Ok(TurnOrder(self.players.clone()))
    }

    /// The session this lobby belongs to.
    pub fn session(&self) -> SessionKey {
        self.session
    }

    /// Who opened the lobby.
    pub fn creator(&self) -> PlayerId {
        self.creator
    }

    /// Members in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns `true` if `id` is a member.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody is in the lobby.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Returns `true` once [`lock`](Self::lock) has succeeded.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
