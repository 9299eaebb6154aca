use opsbell_bridge::notification::{NotificationDraft, NotificationKind};
use serde_json::Value;

/// Placeholder for identifiers the payload does not carry.
const UNKNOWN: &str = "unknown";

/// Domain events pushed by the notification server that turn into
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEvent {
    NewOrder,
    OrdersUpdate,
    OrderAssigned,
    OrderClaimed,
    OrderReleased,
    OrderReached,
    OrderPickedUp,
    OrderDelivered,
}

impl ServerEvent {
    pub const ALL: [ServerEvent; 8] = [
        ServerEvent::NewOrder,
        ServerEvent::OrdersUpdate,
        ServerEvent::OrderAssigned,
        ServerEvent::OrderClaimed,
        ServerEvent::OrderReleased,
        ServerEvent::OrderReached,
        ServerEvent::OrderPickedUp,
        ServerEvent::OrderDelivered,
    ];

    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            ServerEvent::NewOrder => "newOrder",
            ServerEvent::OrdersUpdate => "ordersUpdate",
            ServerEvent::OrderAssigned => "orderAssigned",
            ServerEvent::OrderClaimed => "orderClaimed",
            ServerEvent::OrderReleased => "orderReleased",
            ServerEvent::OrderReached => "orderReached",
            ServerEvent::OrderPickedUp => "orderPickedUp",
            ServerEvent::OrderDelivered => "orderDelivered",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }

    /// Builds the notification for a payload of this event. Returns `None`
    /// when the payload does not describe anything worth showing.
    pub fn to_draft(self, payload: &Value) -> Option<NotificationDraft> {
        let draft = match self {
            ServerEvent::NewOrder => {
                let id = text_of(payload, &["orderId", "_id"]);
                let amount = text_of(payload, &["finalAmount", "total"]).unwrap_or_default();
                NotificationDraft::new(
                    NotificationKind::Order,
                    "New order",
                    format!("Order {} placed - ₹{amount}", id.as_deref().unwrap_or(UNKNOWN)),
                )
                .with_meta(payload.clone())
            }
            ServerEvent::OrdersUpdate => {
                let orders = payload.get("orders")?.as_array()?;
                NotificationDraft::new(
                    NotificationKind::Update,
                    "Orders updated",
                    format!("{} unclaimed orders", orders.len()),
                )
                .with_meta(payload.clone())
            }
            ServerEvent::OrderAssigned => {
                let order = payload
                    .get("order")
                    .filter(|order| order.is_object())
                    .unwrap_or(payload);
                let id = text_of(order, &["orderId", "_id"]);
                NotificationDraft::new(
                    NotificationKind::Assigned,
                    "Order assigned",
                    format!(
                        "You were assigned order {}",
                        id.as_deref().unwrap_or(UNKNOWN)
                    ),
                )
                .with_meta(order.clone())
            }
            ServerEvent::OrderClaimed => status_like(
                NotificationKind::Claimed,
                "Order claimed",
                payload,
                "was claimed",
            ),
            ServerEvent::OrderReleased => NotificationDraft::new(
                NotificationKind::Released,
                "Order released",
                "Some previously-claimed orders are available again",
            ),
            ServerEvent::OrderReached => status_like(
                NotificationKind::Status,
                "Reached pickup",
                payload,
                "reached pickup point",
            ),
            ServerEvent::OrderPickedUp => {
                status_like(NotificationKind::Status, "Picked up", payload, "picked up")
            }
            ServerEvent::OrderDelivered => {
                status_like(NotificationKind::Status, "Delivered", payload, "delivered")
            }
        };

        Some(draft)
    }
}

fn status_like(
    kind: NotificationKind,
    title: &str,
    payload: &Value,
    what_happened: &str,
) -> NotificationDraft {
    let id = text_of(payload, &["orderId"]);
    NotificationDraft::new(
        kind,
        title,
        format!("Order {} {what_happened}", id.as_deref().unwrap_or(UNKNOWN)),
    )
    .with_meta(payload.clone())
}

/// Returns the first of `fields` present on `value` as display text. Null
/// and missing fields fall through to the next one.
fn text_of(value: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match value.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn message(event: ServerEvent, payload: Value) -> String {
        event.to_draft(&payload).unwrap().message.unwrap()
    }

    #[test]
    fn names_round_trip() {
        for event in ServerEvent::ALL {
            assert_eq!(ServerEvent::from_name(event.name()), Some(event));
        }
        assert_eq!(ServerEvent::from_name("joinAdmins"), None);
    }

    #[test]
    fn new_order_falls_back_through_identifiers_and_amounts() {
        assert_eq!(
            message(ServerEvent::NewOrder, json!({ "orderId": "ORD-1", "finalAmount": 499 })),
            "Order ORD-1 placed - ₹499"
        );
        assert_eq!(
            message(ServerEvent::NewOrder, json!({ "_id": "db1", "total": 12.5 })),
            "Order db1 placed - ₹12.5"
        );
        assert_eq!(
            message(ServerEvent::NewOrder, json!({ "orderId": null, "_id": "db2" })),
            "Order db2 placed - ₹"
        );
    }

    #[test]
    fn new_order_keeps_payload_as_meta() {
        let payload = json!({ "orderId": "ORD-1", "orderUrl": "https://x/y" });
        let draft = ServerEvent::NewOrder.to_draft(&payload).unwrap();
        assert_eq!(draft.kind, Some(NotificationKind::Order));
        assert_eq!(draft.meta, Some(payload));
    }

    #[test]
    fn orders_update_requires_an_array() {
        assert_eq!(
            message(ServerEvent::OrdersUpdate, json!({ "orders": [1, 2, 3] })),
            "3 unclaimed orders"
        );
        assert!(ServerEvent::OrdersUpdate.to_draft(&json!({ "orders": 3 })).is_none());
        assert!(ServerEvent::OrdersUpdate.to_draft(&Value::Null).is_none());
    }

    #[test]
    fn order_assigned_unwraps_the_order() {
        let draft = ServerEvent::OrderAssigned
            .to_draft(&json!({ "order": { "_id": "a9" } }))
            .unwrap();
        assert_eq!(draft.message.as_deref(), Some("You were assigned order a9"));
        assert_eq!(draft.meta, Some(json!({ "_id": "a9" })));

        assert_eq!(
            message(ServerEvent::OrderAssigned, json!({ "orderId": "flat" })),
            "You were assigned order flat"
        );
    }

    #[test]
    fn status_events_share_their_shape() {
        let payload = json!({ "orderId": "O7" });
        assert_eq!(message(ServerEvent::OrderClaimed, payload.clone()), "Order O7 was claimed");
        assert_eq!(
            message(ServerEvent::OrderReached, payload.clone()),
            "Order O7 reached pickup point"
        );
        assert_eq!(message(ServerEvent::OrderPickedUp, payload.clone()), "Order O7 picked up");
        assert_eq!(message(ServerEvent::OrderDelivered, payload), "Order O7 delivered");
        assert_eq!(
            ServerEvent::OrderDelivered.to_draft(&json!({})).unwrap().kind,
            Some(NotificationKind::Status)
        );
    }

    #[test]
    fn order_released_carries_no_meta() {
        let draft = ServerEvent::OrderReleased.to_draft(&json!({ "x": 1 })).unwrap();
        assert_eq!(draft.kind, Some(NotificationKind::Released));
        assert_eq!(draft.meta, None);
        assert_eq!(
            draft.message.as_deref(),
            Some("Some previously-claimed orders are available again")
        );
    }

    #[test]
    fn missing_identifiers_read_as_unknown() {
        assert_eq!(message(ServerEvent::OrderClaimed, json!({})), "Order unknown was claimed");
    }
}
