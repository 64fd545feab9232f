/// The state of a Minecraft protocol connection. Selects which packet id
/// namespace is active; owned by the connection, never by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolState {
    Handshaking,
    Status,
    Login,
    Configuration,
    Play,
}

impl ProtocolState {
    pub const ALL: [ProtocolState; 5] = [
        ProtocolState::Handshaking,
        ProtocolState::Status,
        ProtocolState::Login,
        ProtocolState::Configuration,
        ProtocolState::Play,
    ];

    /// Map the handshake's `next_state` field. 3 is a transfer, which
    /// continues as a login.
    pub fn from_handshake_next(next: i32) -> Option<Self> {
        match next {
            1 => Some(ProtocolState::Status),
            2 | 3 => Some(ProtocolState::Login),
            _ => None,
        }
    }

    /// Whether a connection may move from `self` to `next`.
    ///
    /// Play may drop back to Configuration: the server can restart
    /// configuration mid-session since protocol 764.
    pub fn can_transition_to(self, next: ProtocolState) -> bool {
        use ProtocolState::*;
        matches!(
            (self, next),
            (Handshaking, Status)
                | (Handshaking, Login)
                | (Login, Configuration)
                | (Configuration, Play)
                | (Play, Configuration)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ProtocolState::Handshaking => "handshaking",
            ProtocolState::Status => "status",
            ProtocolState::Login => "login",
            ProtocolState::Configuration => "configuration",
            ProtocolState::Play => "play",
        }
    }
}

impl std::fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProtocolState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown protocol state: {s}"))
    }
}

/// Which peer sent a packet. Id namespaces overlap between directions, so
/// every registry serves exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Serverbound => Direction::Clientbound,
            Direction::Clientbound => Direction::Serverbound,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serverbound" | "server" => Ok(Direction::Serverbound),
            "clientbound" | "client" => Ok(Direction::Clientbound),
            _ => Err(format!("unknown direction: {s}")),
        }
    }
}
