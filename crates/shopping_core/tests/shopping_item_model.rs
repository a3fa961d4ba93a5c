use shopping_core::{ShoppingItem, ShoppingItemRecord};

#[test]
fn new_record_is_unbought() {
    let record = ShoppingItemRecord::new(3, "Milk", "oat", 2);

    assert_eq!(record.id, 3);
    assert_eq!(record.title, "Milk");
    assert_eq!(record.notes, "oat");
    assert_eq!(record.quantity, 2);
    assert!(!record.bought);
}

#[test]
fn projection_copies_every_field() {
    let record = ShoppingItemRecord {
        id: 9,
        title: "Coffee".to_string(),
        notes: "beans".to_string(),
        quantity: 3,
        bought: true,
    };

    let item = ShoppingItem::from(&record);
    assert_eq!(item.id(), record.id);
    assert_eq!(item.title(), record.title);
    assert_eq!(item.notes(), record.notes);
    assert_eq!(item.quantity(), record.quantity);
    assert_eq!(item.bought(), record.bought);
    assert!(!item.can_buy());

    assert_eq!(ShoppingItem::from(record.clone()), item);
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let record = ShoppingItemRecord::new(1, "Milk", "", 2);

    let json = serde_json::to_value(ShoppingItem::from(&record)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1,
            "title": "Milk",
            "notes": "",
            "quantity": 2,
            "bought": false
        })
    );

    let decoded: ShoppingItemRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}
