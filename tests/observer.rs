use ferrous_scopes::{
    key_of_type, Key, LoggingObserver, MetricsObserver, NullScope, Observed, ProcessScope, Scope,
    ScopeObserver, ThreadScope,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ScopeObserver<Key> for RecordingObserver {
    fn stored(&self, scope: &str, key: &Key) {
        self.events.lock().unwrap().push(format!("{} stored {}", scope, key));
    }

    fn hit(&self, scope: &str, key: &Key) {
        self.events.lock().unwrap().push(format!("{} hit {}", scope, key));
    }

    fn missed(&self, scope: &str, key: &Key) {
        self.events.lock().unwrap().push(format!("{} missed {}", scope, key));
    }
}

#[test]
fn test_observer_sees_each_call_once() {
    let recorder = Arc::new(RecordingObserver::default());
    let scope = Observed::new("app", ProcessScope::<Key, u32>::new(), recorder.clone());

    assert!(scope.get(&key_of_type::<u32>()).is_err());
    scope.set(key_of_type::<u32>(), 1);
    assert_eq!(scope.get(&key_of_type::<u32>()), Ok(1));

    assert_eq!(
        recorder.events(),
        vec!["app missed u32", "app stored u32", "app hit u32"]
    );
}

#[test]
fn test_observed_scope_passes_results_through() {
    let metrics = Arc::new(MetricsObserver::new());
    let scope = Observed::new("none", NullScope, metrics.clone());

    Scope::<&str, u32>::set(&scope, "k", 1);
    assert!(Scope::<&str, u32>::get(&scope, &"k").is_err());
    assert!(Scope::<&str, u32>::get(&scope, &"k").is_err());

    assert_eq!(metrics.stores(), 1);
    assert_eq!(metrics.hits(), 0);
    assert_eq!(metrics.misses(), 2);
    assert_eq!(metrics.hit_ratio(), Some(0.0));
}

#[test]
fn test_metrics_hit_ratio_and_reset() {
    let metrics = Arc::new(MetricsObserver::new());
    assert_eq!(metrics.hit_ratio(), None);

    let scope = Observed::new("thread", ThreadScope::<&str, u32>::new(), metrics.clone());
    assert!(scope.get(&"k").is_err());
    scope.set("k", 1);
    for _ in 0..3 {
        assert_eq!(scope.get(&"k"), Ok(1));
    }
    assert_eq!(metrics.hit_ratio(), Some(0.75));

    metrics.reset();
    assert_eq!(metrics.stores(), 0);
    assert_eq!(metrics.hit_ratio(), None);
}

#[test]
fn test_logging_observer_does_not_alter_behaviour() {
    let scope = Observed::new(
        "logged",
        ProcessScope::<&str, u32>::new(),
        LoggingObserver::new(),
    );
    assert_eq!(scope.label(), "logged");

    scope.set("k", 4);
    assert_eq!(scope.get(&"k"), Ok(4));
    assert_eq!(scope.inner().len(), 1);
}

#[test]
fn test_observed_as_trait_object() {
    let metrics = Arc::new(MetricsObserver::new());
    let scope: Arc<dyn Scope<&str, u32>> =
        Arc::new(Observed::new("dyn", ProcessScope::<&str, u32>::new(), metrics.clone()));

    scope.set("k", 2);
    assert_eq!(scope.get(&"k"), Ok(2));
    assert_eq!(metrics.hits(), 1);
}
