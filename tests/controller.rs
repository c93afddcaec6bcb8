use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use emr_controller::config::load_engine_configs;
use emr_controller::controller::{
    ControlMode, EmrController, EngineState, OptimalRatio, ReserveReport, ResourceAmount,
    ThrustConfigurationAdapter,
};
use emr_controller::engine;
use emr_controller::propellant::{OxidizerSelection, PropellantChannel, RatioClamp};

fn raptor() -> emr_controller::config::EngineConfig {
    let catalog = load_engine_configs("configs/engines").expect("engine catalog");
    engine::select(&catalog, Some("raptor"))
        .expect("raptor in catalog")
        .clone()
}

fn mass_ratio(state: &EngineState) -> f64 {
    let mass = |name: &str| {
        let channel = state
            .channels
            .iter()
            .find(|c| c.name == name)
            .expect("channel");
        channel.ratio * state.densities[&channel.id]
    };
    mass("LqdOxygen") / mass("LqdMethane")
}

fn tanks(oxidizer: f64, fuel: f64) -> BTreeMap<i32, ResourceAmount> {
    BTreeMap::from([
        (
            10,
            ResourceAmount {
                amount: fuel,
                capacity: fuel,
            },
        ),
        (
            11,
            ResourceAmount {
                amount: oxidizer,
                capacity: oxidizer,
            },
        ),
    ])
}

#[test]
fn editing_applies_interpolated_thrust_and_ratios() {
    let (mut controller, mut state) =
        engine::controller_for(&raptor(), Some("Vacuum")).expect("controller");
    assert_eq!(controller.inputs().starting_emr, 3.8);

    controller.toggle();
    assert_eq!(controller.mode(), ControlMode::Editing);
    controller.set_starting_emr(3.5);
    controller.set_final_emr(3.5);
    let applied = controller
        .apply(&mut state)
        .expect("apply")
        .expect("mixture applied");

    assert_eq!(applied.emr, 3.5);
    assert!((state.max_thrust - 2500.0).abs() < 1e-9);
    assert!((state.min_thrust - 1000.0).abs() < 1e-9);
    assert!((state.curve.evaluate(0.0) - 376.0).abs() < 1e-9);
    assert!((mass_ratio(&state) - 3.5).abs() < 1e-9);
}

#[test]
fn disabled_controller_leaves_engine_untouched() {
    let config = raptor();
    let (mut controller, mut state) = engine::controller_for(&config, None).expect("controller");
    let before = state.clone();
    assert!(controller.apply(&mut state).expect("apply").is_none());
    assert_eq!(state, before);
    assert_eq!(controller.last_applied_emr(), None);
}

#[test]
fn closed_loop_settles_and_holds() {
    let (mut controller, mut state) =
        engine::controller_for(&raptor(), Some("SeaLevel")).expect("controller");
    controller.set_mode(ControlMode::ClosedLoop);

    // 1000 * 0.001141 / (3000 * 0.00042561) = 0.8936 -> below the 3.2 minimum
    let lean = tanks(1000.0, 3000.0);
    match controller.optimal_ratio(&lean) {
        OptimalRatio::Known(optimal) => {
            assert_eq!(optimal.ratio, 3.2);
            assert_eq!(optimal.clamp, RatioClamp::Min);
        }
        OptimalRatio::Unknown => panic!("optimal ratio should be known"),
    }

    let balanced = tanks(3.5 * 1000.0 * 0.00042561 / 0.001141, 1000.0);
    let first = controller
        .update_closed_loop(&mut state, &balanced)
        .expect("tick")
        .expect("first tick applies");
    assert!((first.emr - 3.5).abs() < 1e-9);
    assert!((mass_ratio(&state) - 3.5).abs() < 1e-9);
    assert_eq!(controller.reserve_report(&balanced), ReserveReport::Balanced);

    let second = controller
        .update_closed_loop(&mut state, &balanced)
        .expect("tick");
    assert!(second.is_none());
}

#[test]
fn fuel_rich_reserve_leaves_oxidizer_behind() {
    let (mut controller, mut state) = engine::controller_for(&raptor(), None).expect("controller");
    controller.set_mode(ControlMode::OpenLoop);
    controller.set_current_emr(3.5);
    controller.set_reserve_percent(10.0);
    controller.apply(&mut state).expect("apply");

    let oxidizer = 3.5 * 1000.0 * 0.00042561 / 0.001141;
    let full = tanks(oxidizer, 1000.0);
    match controller.reserve_report(&full) {
        ReserveReport::Surplus(surplus) => {
            assert_eq!(surplus.len(), 1);
            assert_eq!(surplus[0].name, "LqdOxygen");
            assert!((surplus[0].volume - 0.1 * oxidizer).abs() < 1e-6);
        }
        other => panic!("expected oxygen surplus, got {other:?}"),
    }
}

struct SwitchAdapter {
    name: Mutex<String>,
    pushed: Mutex<Vec<f64>>,
}

impl ThrustConfigurationAdapter for SwitchAdapter {
    fn current_configuration_name(&self) -> String {
        self.name.lock().unwrap().clone()
    }

    fn apply_min_thrust(&self, min_thrust: f64) {
        self.pushed.lock().unwrap().push(min_thrust);
    }
}

#[test]
fn adapter_drives_configuration_and_receives_min_thrust() {
    let config = raptor();
    let adapter = Arc::new(SwitchAdapter {
        name: Mutex::new("SeaLevel".to_string()),
        pushed: Mutex::new(Vec::new()),
    });
    let mut state = engine::engine_state(&config);
    let store = engine::mixture_store(&config).expect("store");
    let mut controller = EmrController::new(store).with_adapter(adapter.clone());
    controller.attach(&state).expect("attach");
    controller.set_mode(ControlMode::Editing);

    controller.apply(&mut state).expect("apply");
    assert_eq!(controller.config_name(), "SeaLevel");
    assert_eq!(state.max_thrust, 2300.0);

    *adapter.name.lock().unwrap() = "Vacuum".to_string();
    controller.apply(&mut state).expect("apply");
    assert_eq!(controller.config_name(), "Vacuum");
    assert_eq!(state.max_thrust, 2600.0);
    assert_eq!(*adapter.pushed.lock().unwrap(), vec![920.0, 1040.0]);
    assert!(!controller.is_updating_adapter());
}

#[test]
fn equal_mass_flow_uses_oxidizer_name() {
    let channels = vec![
        PropellantChannel {
            id: 0,
            name: "LiquidFuel".into(),
            ratio: 0.9,
        },
        PropellantChannel {
            id: 1,
            name: "Oxidizer".into(),
            ratio: 1.1,
        },
    ];
    let densities = BTreeMap::from([(0, 0.0055), (1, 0.0045)]);
    let state = EngineState::new(channels, densities);
    let store = engine::mixture_store(&raptor()).expect("store");
    let mut controller = EmrController::new(store);
    controller.attach(&state).expect("attach");

    let resources = controller.resources().expect("attached");
    assert_eq!(resources.oxidizer().name, "Oxidizer");
    assert_eq!(resources.oxidizer_selection(), OxidizerSelection::NameHint);
}
