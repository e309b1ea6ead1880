use uuid::Uuid;

/// Published once per confirmed seat reservation.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingConfirmedEvent {
    pub confirmation_id: Uuid,
    pub trip_id: u64,
    pub sequence: u64,
    pub seats_remaining: u32,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionChangedEvent {
    SignedIn { user_id: Uuid, timestamp: i64 },
    SignedOut { user_id: Uuid, timestamp: i64 },
}

impl SessionChangedEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            SessionChangedEvent::SignedIn { user_id, .. } => *user_id,
            SessionChangedEvent::SignedOut { user_id, .. } => *user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_event_wire_format() {
        let user_id = Uuid::new_v4();
        let event = SessionChangedEvent::SignedIn { user_id, timestamp: 1_700_000_000 };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "SIGNED_IN");
        assert_eq!(json["user_id"], user_id.to_string());
        assert_eq!(event.user_id(), user_id);
    }
}
