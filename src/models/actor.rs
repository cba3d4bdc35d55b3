use serde::{Deserialize, Serialize};

/// The authenticated caller, as established by the (external) auth layer.
/// Each variant carries only the identity relevant to that role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Actor {
    Customer(String),
    Owner(String),
    Staff(String),
    Admin(String),
}

impl Actor {
    pub fn from_parts(role: &str, id: String) -> Option<Self> {
        match role {
            "customer" => Some(Actor::Customer(id)),
            "owner" => Some(Actor::Owner(id)),
            "staff" => Some(Actor::Staff(id)),
            "admin" => Some(Actor::Admin(id)),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Actor::Customer(id) | Actor::Owner(id) | Actor::Staff(id) | Actor::Admin(id) => id,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Actor::Customer(_) => "customer",
            Actor::Owner(_) => "owner",
            Actor::Staff(_) => "staff",
            Actor::Admin(_) => "admin",
        }
    }

    /// Salon-side actors drive accept/reject/start/complete/no-show.
    pub fn is_salon_side(&self) -> bool {
        matches!(self, Actor::Owner(_) | Actor::Staff(_) | Actor::Admin(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Actor::from_parts("customer", "u1".to_string()),
            Some(Actor::Customer("u1".to_string()))
        );
        assert!(Actor::from_parts("superuser", "u1".to_string()).is_none());
    }

    #[test]
    fn test_salon_side() {
        assert!(!Actor::Customer("u1".to_string()).is_salon_side());
        assert!(Actor::Owner("u2".to_string()).is_salon_side());
        assert!(Actor::Staff("u3".to_string()).is_salon_side());
        assert!(Actor::Admin("u4".to_string()).is_salon_side());
    }
}
