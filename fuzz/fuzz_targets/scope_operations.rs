#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_scopes::{NullScope, ProcessScope, Scope, ScopeError, ThreadScope};
use std::collections::HashMap;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let process = ProcessScope::<u8, Arc<u8>>::new();
    let thread = ThreadScope::<u8, Arc<u8>>::new();
    let null = NullScope;
    let mut model: HashMap<u8, Arc<u8>> = HashMap::new();

    // Each pair of bytes is one operation: the low bit of the first byte
    // picks set or get, the second byte is the key.
    for chunk in data.chunks_exact(2) {
        let (op, key) = (chunk[0], chunk[1]);
        if op & 1 == 0 {
            let value = Arc::new(op);
            process.set(key, value.clone());
            thread.set(key, value.clone());
            null.set(key, value.clone());
            model.insert(key, value);
        } else {
            match model.get(&key) {
                Some(expected) => {
                    assert!(Arc::ptr_eq(&process.get(&key).unwrap(), expected));
                    assert!(Arc::ptr_eq(&thread.get(&key).unwrap(), expected));
                }
                None => {
                    assert_eq!(process.get(&key).unwrap_err(), ScopeError::NotFound(key));
                    assert_eq!(thread.get(&key).unwrap_err(), ScopeError::NotFound(key));
                }
            }
            assert!(Scope::<u8, Arc<u8>>::get(&null, &key).is_err());
        }
    }

    assert_eq!(process.len(), model.len());
});
