use super::*;

#[test]
fn routing_is_deterministic_for_the_same_key() {
    let key = RoutingKey::from_str("user-42");
    assert_eq!(key.route(4), key.route(4));
}

#[test]
fn routing_stays_in_range() {
    for key in ["a", "b", "c", "user-1", "user-2", "session-xyz"] {
        let instance = RoutingKey::from_str(key).route(3);
        assert!(instance < 3);
    }
}

#[test]
fn routing_is_a_function_of_the_key_not_insertion_order() {
    let a = RoutingKey::from_str("same-key").route(8);
    let b = RoutingKey::from_str("same-key").route(8);
    assert_eq!(a, b);
}

#[test]
fn single_instance_always_routes_to_zero() {
    for key in ["x", "y", "z"] {
        assert_eq!(RoutingKey::from_str(key).route(1), 0);
    }
}

#[test]
fn different_keys_spread_across_instances() {
    let instances: std::collections::BTreeSet<u32> = (0..50)
        .map(|i| RoutingKey::from_str(&format!("key-{i}")).route(4))
        .collect();
    assert!(instances.len() > 1, "50 distinct keys should not all land on one instance");
}
