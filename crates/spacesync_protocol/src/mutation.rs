//! Mutations and the registered mutation kinds.
//!
//! A mutation arrives on the wire as a name plus free-form arguments.
//! Interpretation goes through [`MutationKind`], a closed registry:
//! each registered kind decodes and validates its arguments into a typed
//! struct, and unrecognized names produce a typed
//! [`ProtocolError::UnknownMutation`] instead of a lookup miss at the
//! application site.

use crate::error::{ProtocolError, ProtocolResult};
use crate::ids::{ClientId, MessageId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single client-generated mutation inside a push batch.
///
/// Mutation ids are per-client and must increase by exactly 1 per
/// accepted mutation; the server uses them for deduplication and gap
/// detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Per-client mutation id.
    pub id: u64,
    /// The client that generated this mutation.
    #[serde(rename = "clientID")]
    pub client_id: ClientId,
    /// Registered mutation kind name, e.g. `createMessage`.
    pub name: String,
    /// Kind-specific arguments; validated by [`MutationKind::parse`].
    #[serde(default)]
    pub args: Value,
}

impl Mutation {
    /// Resolves this mutation's name and arguments against the registry.
    pub fn kind(&self) -> ProtocolResult<MutationKind> {
        MutationKind::parse(&self.name, &self.args)
    }
}

/// The closed set of mutation kinds this protocol applies.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    /// Insert a new live message.
    CreateMessage(CreateMessageArgs),
    /// Tombstone an existing message.
    DeleteMessage(DeleteMessageArgs),
}

impl MutationKind {
    /// Decodes a named mutation's arguments into its typed form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownMutation`] for an unregistered
    /// name and [`ProtocolError::InvalidArgs`] when the arguments do not
    /// match the kind's shape.
    pub fn parse(name: &str, args: &Value) -> ProtocolResult<Self> {
        match name {
            "createMessage" => decode_args(name, args).map(MutationKind::CreateMessage),
            "deleteMessage" => decode_args(name, args).map(MutationKind::DeleteMessage),
            _ => Err(ProtocolError::UnknownMutation {
                name: name.to_string(),
            }),
        }
    }

    /// Returns the wire name of this kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MutationKind::CreateMessage(_) => "createMessage",
            MutationKind::DeleteMessage(_) => "deleteMessage",
        }
    }
}

fn decode_args<T: for<'de> Deserialize<'de>>(name: &str, args: &Value) -> ProtocolResult<T> {
    serde_json::from_value(args.clone()).map_err(|e| ProtocolError::InvalidArgs {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Arguments for `createMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMessageArgs {
    /// Id of the message to create; unique within its space.
    pub id: MessageId,
    /// Sender of the message.
    pub from: String,
    /// Message body.
    pub content: String,
    /// Application-defined ordering key.
    pub order: i64,
}

/// Arguments for `deleteMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteMessageArgs {
    /// Id of the message to tombstone.
    pub id: MessageId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mutation_wire_shape() {
        let m: Mutation = serde_json::from_value(json!({
            "id": 1,
            "clientID": "c1",
            "name": "createMessage",
            "args": {"id": "m1", "from": "c1", "content": "hi", "order": 1}
        }))
        .unwrap();

        assert_eq!(m.id, 1);
        assert_eq!(m.client_id, ClientId::new("c1"));
        assert_eq!(m.name, "createMessage");
    }

    #[test]
    fn parse_create_message() {
        let kind = MutationKind::parse(
            "createMessage",
            &json!({"id": "m1", "from": "c1", "content": "hi", "order": 1}),
        )
        .unwrap();

        match kind {
            MutationKind::CreateMessage(args) => {
                assert_eq!(args.id, MessageId::new("m1"));
                assert_eq!(args.from, "c1");
                assert_eq!(args.content, "hi");
                assert_eq!(args.order, 1);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn parse_delete_message() {
        let kind = MutationKind::parse("deleteMessage", &json!({"id": "m1"})).unwrap();
        assert_eq!(
            kind,
            MutationKind::DeleteMessage(DeleteMessageArgs {
                id: MessageId::new("m1")
            })
        );
        assert_eq!(kind.name(), "deleteMessage");
    }

    #[test]
    fn unknown_name_is_typed() {
        let err = MutationKind::parse("renameMessage", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnknownMutation { name } if name == "renameMessage"
        ));
    }

    #[test]
    fn malformed_args_are_invalid() {
        let err =
            MutationKind::parse("createMessage", &json!({"id": "m1", "order": "first"}))
                .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidArgs { name, .. } if name == "createMessage"));
    }

    #[test]
    fn missing_args_default_to_null() {
        let m: Mutation = serde_json::from_value(json!({
            "id": 3,
            "clientID": "c1",
            "name": "deleteMessage"
        }))
        .unwrap();
        assert_eq!(m.args, Value::Null);
        assert!(m.kind().is_err());
    }
}
