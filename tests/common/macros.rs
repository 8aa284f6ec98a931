/// Asserts that the entity is still registered.
#[macro_export]
macro_rules! assert_alive {
    ($sim:expr, $id:expr) => {
        assert!(
            $sim.registry.is_alive($id),
            "Entity {} should be alive but was not found",
            $id
        );
    };
}

/// Asserts that the entity was destroyed and no component lookup succeeds.
#[macro_export]
macro_rules! assert_destroyed {
    ($sim:expr, $id:expr) => {
        assert!(
            !$sim.registry.is_alive($id),
            "Entity {} should be destroyed but is alive",
            $id
        );
        assert!(
            $sim.registry.was_destroyed($id),
            "Entity {} was never destroyed",
            $id
        );
        assert!($sim
            .registry
            .try_get_component::<orchard_lib::data::AreaPhysicsComponent>($id)
            .is_none());
    };
}

/// Counts the events matching a pattern.
#[macro_export]
macro_rules! count_events {
    ($events:expr, $pattern:pat) => {
        $events.iter().filter(|e| matches!(e, $pattern)).count()
    };
}
