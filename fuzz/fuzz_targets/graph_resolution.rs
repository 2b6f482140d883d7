#![no_main]

use iotlogic_di::{DiError, Key, Lifetime, Resolver, ServiceCollection};
use libfuzzer_sys::fuzz_target;

const NAMES: [&str; 8] = ["g0", "g1", "g2", "g3", "g4", "g5", "g6", "g7"];

struct Node;

// Two bytes per node: lifetime selector, then a bitmask of dependencies.
// Cycles, self-loops and dangling edges are all allowed.
fuzz_target!(|data: &[u8]| {
    let nodes: Vec<(Lifetime, u8)> = data
        .chunks_exact(2)
        .take(NAMES.len())
        .map(|pair| {
            let lifetime = match pair[0] % 3 {
                0 => Lifetime::Singleton,
                1 => Lifetime::Scoped,
                _ => Lifetime::Transient,
            };
            (lifetime, pair[1])
        })
        .collect();

    let mut services = ServiceCollection::new();
    for (i, (lifetime, mask)) in nodes.iter().enumerate() {
        let deps: Vec<Key> = (0..NAMES.len())
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| Key::named::<Node>(NAMES[bit]))
            .collect();
        services.add_named_factory::<Node, _>(NAMES[i], *lifetime, deps, |_| Ok(Node));
    }

    // Whatever build() accepts must resolve without graph errors
    let Ok(provider) = services.build() else {
        return;
    };
    let scope = provider.create_scope();
    for name in NAMES.iter().take(nodes.len()) {
        match scope.get_named::<Node>(*name) {
            Ok(_) => {}
            Err(err @ (DiError::Circular(_) | DiError::Unresolved { .. } | DiError::WrongLifetime { .. })) => {
                panic!("validated graph failed to resolve {}: {}", name, err)
            }
            Err(_) => {}
        }
    }
});
