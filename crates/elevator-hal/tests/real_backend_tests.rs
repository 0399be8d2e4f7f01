//! 真实硬件后端测试（使用 Mock 驱动器）

mod common;

use common::mock_motor::MockMotor;
use elevator_core::{ElevatorConfig, Meters, Volts};
use elevator_hal::{
    ActuatorIo, Environment, HalError, MotorGroup, NeutralMode, RealElevator, create_actuator,
};

fn build() -> (
    RealElevator,
    std::sync::Arc<std::sync::Mutex<common::mock_motor::MockMotorState>>,
    std::sync::Arc<std::sync::Mutex<common::mock_motor::MockMotorState>>,
) {
    let (leader, leader_state) = MockMotor::new(11);
    let (follower, follower_state) = MockMotor::new(12);
    let group = MotorGroup::new(Box::new(leader)).with_follower(Box::new(follower), true);
    let elevator = RealElevator::new(group, &ElevatorConfig::default().mechanism).unwrap();
    (elevator, leader_state, follower_state)
}

#[test]
fn test_configures_brake_and_current_limit() {
    let (_elevator, leader, follower) = build();

    for state in [&leader, &follower] {
        let config = state.lock().unwrap().config.expect("config applied");
        assert_eq!(config.neutral_mode, NeutralMode::Brake);
        assert_eq!(config.supply_current_limit, 65.0);
    }
}

#[test]
fn test_follower_mirrors_leader_opposed() {
    let (elevator, leader, follower) = build();

    assert_eq!(follower.lock().unwrap().following, Some((11, true)));
    assert_eq!(leader.lock().unwrap().following, None);
    assert_eq!(elevator.follower_count(), 1);
}

#[test]
fn test_voltage_goes_to_leader_only() {
    let (mut elevator, leader, follower) = build();

    elevator.set_voltage(Volts(3.5)).unwrap();
    assert_eq!(leader.lock().unwrap().voltages, vec![3.5]);
    assert!(follower.lock().unwrap().voltages.is_empty());
}

#[test]
fn test_reports_physical_units() {
    let (elevator, leader, _) = build();
    let ratio = elevator.rotations_per_meter();

    {
        let mut state = leader.lock().unwrap();
        state.rotor_position = ratio * 1.2;
        state.rotor_velocity = ratio * -0.5;
    }

    assert!((elevator.position().unwrap().0 - 1.2).abs() < 1e-12);
    assert!((elevator.velocity().unwrap().0 + 0.5).abs() < 1e-12);
    // 9.375 / (0.14016 * 2) ≈ 33.44 rot/m
    assert!((ratio - 33.443).abs() < 0.01);
}

#[test]
fn test_reset_position_zeroes() {
    let (mut elevator, leader, _) = build();
    leader.lock().unwrap().rotor_position = 17.0;

    elevator.reset_position().unwrap();
    assert_eq!(elevator.position().unwrap(), Meters(0.0));
}

#[test]
fn test_read_failure_propagates() {
    let (elevator, leader, _) = build();
    leader.lock().unwrap().disconnected = true;

    let err = elevator.position().unwrap_err();
    assert!(err.is_fatal());
    assert!(elevator.velocity().is_err());
}

#[test]
fn test_non_finite_reading_rejected() {
    let (elevator, leader, _) = build();
    leader.lock().unwrap().rotor_position = f64::NAN;

    match elevator.position() {
        Err(HalError::InvalidReading { id, .. }) => assert_eq!(id, 11),
        other => panic!("Expected InvalidReading, got {:?}", other.map(|m| m.0)),
    }
}

#[test]
fn test_factory_builds_real_backend() {
    let (leader, leader_state) = MockMotor::new(11);
    let group = MotorGroup::new(Box::new(leader));
    let mut actuator =
        create_actuator(Environment::Real, &ElevatorConfig::default(), Some(group)).unwrap();

    assert_eq!(actuator.environment(), Environment::Real);
    actuator.set_voltage(Volts(-1.0)).unwrap();
    assert_eq!(leader_state.lock().unwrap().voltages, vec![-1.0]);
}

#[test]
fn test_configuration_failure_surfaces() {
    let (leader, leader_state) = MockMotor::new(11);
    leader_state.lock().unwrap().disconnected = true;

    let result = RealElevator::new(
        MotorGroup::new(Box::new(leader)),
        &ElevatorConfig::default().mechanism,
    );
    assert!(result.is_err());
}
