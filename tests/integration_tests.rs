//! 集成测试 - 多级加载器链

mod common;

use common::{loader, memory_fs, name};
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use swapload::vfs::VirtualFileSystem;
use swapload::{
    Harness, HarnessConfig, LoadError, Loader, NoParent, Ordering, Origin, StaticParent,
};

/// system <- app <- plugin, all over one memory file system
fn three_levels(fs: &swapload::vfs::MemoryFileSystem, plugin_order: Ordering) -> (Arc<Loader>, Arc<Loader>, Loader) {
    let system = Arc::new(loader(fs, "/system", Arc::new(NoParent), Ordering::LocalFirst));
    let app = Arc::new(loader(fs, "/app", system.clone(), Ordering::ParentFirst));
    let plugin = loader(fs, "/plugin", app.clone(), plugin_order);
    (system, app, plugin)
}

#[test]
fn test_chain_resolves_each_level() {
    let fs = memory_fs(&[
        ("/system/Base.mod", "base"),
        ("/app/Service.mod", "service"),
        ("/plugin/Feature.mod", "feature"),
    ]);
    let (system, app, plugin) = three_levels(&fs, Ordering::LocalFirst);

    let base = plugin.load(&name("Base")).unwrap();
    let service = plugin.load(&name("Service")).unwrap();
    let feature = plugin.load(&name("Feature")).unwrap();

    assert_eq!(base.owner(), system.id());
    assert_eq!(service.owner(), app.id());
    assert_eq!(feature.owner(), plugin.id());

    // Only the defining loader caches
    assert_eq!(plugin.loaded_names(), vec![name("Feature")]);
    assert_eq!(app.loaded_names(), vec![name("Service")]);
    assert_eq!(system.loaded_names(), vec![name("Base")]);
}

#[test]
fn test_parent_first_shadows_override_at_every_level() {
    let fs = memory_fs(&[
        ("/system/Base.mod", "system base"),
        ("/app/Base.mod", "app base"),
        ("/plugin/Base.mod", "plugin base"),
    ]);

    let (system, _app, local_plugin) = three_levels(&fs, Ordering::LocalFirst);
    assert_eq!(local_plugin.load(&name("Base")).unwrap().bytes().as_slice(), b"plugin base");

    // app is parent-first, so a parent-first plugin ends up at the system loader
    let (system2, _app2, parent_plugin) = three_levels(&fs, Ordering::ParentFirst);
    let handle = parent_plugin.load(&name("Base")).unwrap();
    assert_eq!(handle.bytes().as_slice(), b"system base");
    assert_eq!(handle.owner(), system2.id());
    assert_ne!(system.id(), system2.id());
}

#[test]
fn test_not_found_surfaces_through_chain() {
    let fs = memory_fs(&[("/system/Base.mod", "base")]);
    let (system, app, plugin) = three_levels(&fs, Ordering::ParentFirst);

    let err = plugin.load(&name("Ghost")).unwrap_err();
    assert_eq!(err, LoadError::not_found(&name("Ghost")));
    assert!(plugin.is_empty() && app.is_empty() && system.is_empty());
}

#[test]
fn test_unreadable_parent_record_is_not_masked() {
    let fs = memory_fs(&[("/app/Service.mod", "service"), ("/plugin/Service.mod", "plugin")]);
    fs.deny_reads(Path::new("/app/Service.mod"));
    let (_system, _app, plugin) = three_levels(&fs, Ordering::ParentFirst);

    // The plugin has its own copy, but the parent's failure is reported as is
    let err = plugin.load(&name("Service")).unwrap_err();
    assert!(matches!(err, LoadError::IoFailure { .. }), "got {:?}", err);

    fs.allow_reads(Path::new("/app/Service.mod"));
    assert_eq!(plugin.load(&name("Service")).unwrap().bytes().as_slice(), b"service");
}

#[test]
fn test_concurrent_plugins_share_parent_definitions() {
    let fs = memory_fs(&[("/system/Base.mod", "base"), ("/plugin/Feature.mod", "feature")]);
    let system = Arc::new(loader(&fs, "/system", Arc::new(NoParent), Ordering::LocalFirst));
    let barrier = Arc::new(Barrier::new(8));

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let fs = fs.clone();
            let system = system.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let plugin = loader(&fs, "/plugin", system, Ordering::LocalFirst);
                barrier.wait();
                (plugin.load(&name("Base")).unwrap(), plugin.load(&name("Feature")).unwrap())
            })
        })
        .collect();
    let results: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

    assert_eq!(system.materializations(), 1);
    for (base, feature) in &results[1..] {
        assert_eq!(*base, results[0].0);
        assert_ne!(*feature, results[0].1);
    }
}

#[test]
fn test_static_parent_under_loader() {
    let fs = memory_fs(&[("/app/Foo.mod", "foo")]);
    let builtins = Arc::new(StaticParent::new().with_module(name("Builtin"), "builtin"));
    let app = loader(&fs, "/app", builtins.clone(), Ordering::LocalFirst);

    let resolved = app.resolve(&name("Builtin")).unwrap();
    assert_eq!(resolved.origin, Origin::Parent);
    assert_eq!(resolved.handle.owner(), builtins.id());
    assert!(!app.owns(&resolved.handle));
}

#[test]
fn test_harness_isolated_from_rewrites() {
    let fs = memory_fs(&[("/app/Foo.mod", "v1")]);
    let app = loader(&fs, "/app", Arc::new(NoParent), Ordering::LocalFirst);
    let mut harness = Harness::new(HarnessConfig {
        workers: 1,
        interval_ms: 5,
        max_iterations: None,
    });
    harness.spawn(&app, &name("Foo")).unwrap();
    assert_eq!(
        harness.recv_observation(Duration::from_secs(5)).unwrap().output.unwrap(),
        "v1"
    );

    fs.write_file(Path::new("/app/Foo.mod"), b"v2").unwrap();
    harness.observations();
    for _ in 0..5 {
        let observation = harness.recv_observation(Duration::from_secs(5)).unwrap();
        assert_eq!(observation.output.unwrap(), "v1");
    }
    assert_eq!(app.stale_modules().unwrap().len(), 1);

    let fresh = loader(&fs, "/app", Arc::new(NoParent), Ordering::LocalFirst);
    assert_eq!(fresh.load(&name("Foo")).unwrap().bytes().as_slice(), b"v2");

    let reports = harness.shutdown().unwrap();
    assert!(reports[0].iterations >= 6);
}
