mod build_up_test {
    use derivative::Derivative;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Weak;
    use yadic::abstraction;
    use yadic::container::{Container, ContainerBuilder};
    use yadic::descriptor::{TypeDescriptor, TypeDescriptors};
    use yadic::error::{IncorrectMemberReason, ResolutionError};
    use yadic::instance::InstancePtr;
    use yadic::registry::Lifetime;
    use yadic::type_key::TypeKey;

    trait Clock {
        fn now(&self) -> u64;
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            42
        }
    }

    abstraction!(dyn Clock + Send + Sync => FixedClock);

    #[derive(Debug)]
    struct Logger;

    #[derive(Default, Derivative)]
    #[derivative(Debug)]
    struct Report {
        #[derivative(Debug = "ignore")]
        clock: Mutex<Option<InstancePtr<dyn Clock + Send + Sync>>>,
        logger: Mutex<Option<InstancePtr<Logger>>>,
    }

    #[derive(Default, Debug)]
    struct Invalid {
        logger: Mutex<Option<InstancePtr<Logger>>>,
        resets: AtomicUsize,
    }

    #[derive(Default, Debug)]
    struct Greedy {
        logger: Mutex<Option<InstancePtr<Logger>>>,
    }

    #[derive(Default, Debug)]
    struct Node {
        this: Mutex<Weak<Node>>,
    }

    #[derive(Default, Debug)]
    struct Service {
        helper: Mutex<Option<InstancePtr<Helper>>>,
    }

    #[derive(Debug)]
    struct Helper {
        service: Weak<Service>,
    }

    fn create_descriptors() -> TypeDescriptors {
        TypeDescriptors::new()
            .with_abstract::<dyn Clock + Send + Sync>()
            .with_type(TypeDescriptor::<FixedClock>::new().constructor(|| FixedClock))
            .with_type(TypeDescriptor::<Logger>::new().constructor(|| Logger))
            .with_type(
                TypeDescriptor::<Report>::new()
                    .constructor(Report::default)
                    .member(
                        "set_clock",
                        |report: &Report, clock: InstancePtr<dyn Clock + Send + Sync>| {
                            *report.clock.lock() = Some(clock);
                        },
                    )
                    .member("set_logger", |report: &Report, logger: InstancePtr<Logger>| {
                        *report.logger.lock() = Some(logger);
                    }),
            )
            .with_type(
                TypeDescriptor::<Invalid>::new()
                    .constructor(Invalid::default)
                    .member("set_logger", |invalid: &Invalid, logger: InstancePtr<Logger>| {
                        *invalid.logger.lock() = Some(logger);
                    })
                    .member("reset", |invalid: &Invalid| {
                        invalid.resets.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .with_type(
                TypeDescriptor::<Greedy>::new()
                    .constructor(Greedy::default)
                    .member("set_logger", |greedy: &Greedy, logger: InstancePtr<Logger>| {
                        greedy.logger.lock().replace(logger).is_some()
                    }),
            )
            .with_type(TypeDescriptor::<Node>::new().constructor(Node::default).member(
                "set_this",
                |node: &Node, this: InstancePtr<Node>| {
                    *node.this.lock() = InstancePtr::downgrade(&this);
                },
            ))
            .with_type(
                TypeDescriptor::<Service>::new()
                    .constructor(Service::default)
                    .member("set_helper", |service: &Service, helper: InstancePtr<Helper>| {
                        *service.helper.lock() = Some(helper);
                    }),
            )
            .with_type(
                TypeDescriptor::<Helper>::new().constructor(|service: InstancePtr<Service>| Helper {
                    service: InstancePtr::downgrade(&service),
                }),
            )
    }

    fn create_container() -> Container {
        let container = ContainerBuilder::new()
            .with_descriptor_provider(Box::new(create_descriptors()))
            .build();

        container
            .register_mapping::<dyn Clock + Send + Sync, FixedClock>()
            .unwrap();

        container
    }

    #[test]
    fn should_build_up_existing_instance() {
        let container = create_container();
        let report = InstancePtr::new(Report::default());

        let built = container.build_up(report.clone()).unwrap();

        assert!(InstancePtr::ptr_eq(&built, &report));
        assert_eq!(report.clock.lock().as_ref().unwrap().now(), 42);
        assert!(report.logger.lock().is_some());
    }

    #[test]
    fn should_build_up_resolved_instance() {
        let container = create_container();

        let report = container.resolve::<Report>().unwrap();

        assert!(report.clock.lock().is_some());
        assert!(report.logger.lock().is_some());
    }

    #[test]
    fn should_build_up_type_without_members() {
        let container = create_container();
        let logger = InstancePtr::new(Logger);

        assert!(InstancePtr::ptr_eq(
            &container.build_up(logger.clone()).unwrap(),
            &logger
        ));
    }

    #[test]
    fn should_reject_member_without_parameters_before_invoking_any() {
        let container = create_container();
        let invalid = InstancePtr::new(Invalid::default());

        assert!(matches!(
            container.build_up(invalid.clone()).unwrap_err(),
            ResolutionError::IncorrectDependencyMember {
                target,
                member,
                reason: IncorrectMemberReason::NoParameters,
            } if target == TypeKey::of::<Invalid>() && member == "reset"
        ));
        assert!(invalid.logger.lock().is_none());
        assert_eq!(invalid.resets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_reject_member_returning_value() {
        let container = create_container();

        assert!(matches!(
            container.resolve::<Greedy>().unwrap_err(),
            ResolutionError::IncorrectDependencyMember {
                reason: IncorrectMemberReason::ReturnsValue,
                ..
            }
        ));
    }

    #[test]
    fn should_detect_transient_self_injection() {
        let container = create_container();

        assert!(matches!(
            container.resolve::<Node>().unwrap_err(),
            ResolutionError::CircularDependency { key, .. } if key == TypeKey::of::<Node>()
        ));
    }

    #[test]
    fn should_inject_singleton_into_itself() {
        let container = create_container();
        container
            .register_type_with::<Node>(Lifetime::Singleton)
            .unwrap();

        let node = container.resolve::<Node>().unwrap();
        let this = node.this.lock().upgrade().unwrap();

        assert!(InstancePtr::ptr_eq(&node, &this));
    }

    #[test]
    fn should_not_cache_singleton_with_failed_build_up() {
        let container = ContainerBuilder::new()
            .with_descriptor_provider(Box::new(create_descriptors()))
            .build();
        container
            .register_type_with::<Report>(Lifetime::Singleton)
            .unwrap();

        assert!(matches!(
            container.resolve::<Report>().unwrap_err(),
            ResolutionError::AbstractType(_)
        ));

        container
            .register_mapping::<dyn Clock + Send + Sync, FixedClock>()
            .unwrap();

        let first = container.resolve::<Report>().unwrap();
        let second = container.resolve::<Report>().unwrap();

        assert!(first.clock.lock().is_some());
        assert!(InstancePtr::ptr_eq(&first, &second));
    }

    #[test]
    fn should_break_constructor_cycle_through_singleton_member() {
        let container = create_container();
        container
            .register_type_with::<Service>(Lifetime::Singleton)
            .unwrap();

        let service = container.resolve::<Service>().unwrap();
        let helper = service.helper.lock().clone().unwrap();

        assert!(InstancePtr::ptr_eq(
            &helper.service.upgrade().unwrap(),
            &service
        ));
        assert!(InstancePtr::ptr_eq(
            &container.resolve::<Service>().unwrap(),
            &service
        ));
    }

    #[test]
    fn should_detect_constructor_cycle_through_transient_member() {
        let container = create_container();
        container.register_type::<Service>().unwrap();

        assert!(matches!(
            container.resolve::<Service>().unwrap_err(),
            ResolutionError::CircularDependency { key, .. } if key == TypeKey::of::<Service>()
        ));
    }
}
