use super::common::*;
use crate::booking::admission::{AdmissionPolicy, AdmissionRejection};
use crate::booking::domain::AppointmentStatus;
use crate::booking::repository::{AppointmentRepository, InMemoryAppointmentRepository};
use crate::booking::service::BookingError;

fn seeded_store() -> InMemoryAppointmentRepository {
    let store = InMemoryAppointmentRepository::default();
    let policy = AdmissionPolicy::default();
    let admitted = policy
        .admit(&request("1", slot(0, 10, 0)), now(), &store)
        .expect("seed admitted");
    store.insert(admitted).expect("seed stored");
    store
}

fn rejection(result: Result<crate::booking::Appointment, BookingError>) -> AdmissionRejection {
    match result {
        Err(BookingError::Rejected(rejection)) => rejection,
        other => panic!("expected admission rejection, got {other:?}"),
    }
}

#[test]
fn admitted_record_is_stamped_on_the_business_clock() {
    let store = InMemoryAppointmentRepository::default();
    let admitted = AdmissionPolicy::default()
        .admit(&request("1", slot(1, 9, 0)), now(), &store)
        .expect("admitted");

    assert_eq!(admitted.status, AppointmentStatus::Pending);
    assert_eq!(admitted.created_at, now());
    assert_eq!(admitted.created_at.offset().local_minus_utc(), 19_800);
    assert!(store.list_all().expect("list").is_empty(), "admit must not write");
}

#[test]
fn caller_supplied_status_is_kept() {
    let store = InMemoryAppointmentRepository::default();
    let mut candidate = request("1", slot(0, 11, 0));
    candidate.status = AppointmentStatus::Approved;
    let admitted = AdmissionPolicy::default()
        .admit(&candidate, now(), &store)
        .expect("admitted");
    assert_eq!(admitted.status, AppointmentStatus::Approved);
}

#[test]
fn duplicate_id_wins_over_every_other_reason() {
    let store = seeded_store();
    // Same slot, outside the window and off hours would all fail too.
    let candidate = request("1", slot(0, 10, 0));
    let result = AdmissionPolicy::default().admit(&candidate, now(), &store);
    assert_eq!(rejection(result).code(), "duplicate_id");

    let candidate = request("1", slot(5, 19, 30));
    let result = AdmissionPolicy::default().admit(&candidate, now(), &store);
    assert_eq!(rejection(result).code(), "duplicate_id");
}

#[test]
fn slot_taken_is_reported_before_schedule_checks() {
    let store = seeded_store();
    // Pretend the clock moved two days on, so the stored slot is now in the past.
    let later = now() + chrono::Duration::days(2);
    let result = AdmissionPolicy::default().admit(&request("2", slot(0, 10, 0)), later, &store);
    assert_eq!(rejection(result).code(), "slot_taken");
}

#[test]
fn window_is_reported_before_hours() {
    let store = seeded_store();
    let result = AdmissionPolicy::default().admit(&request("2", slot(3, 7, 15)), now(), &store);
    assert_eq!(rejection(result).code(), "out_of_window");

    let result = AdmissionPolicy::default().admit(&request("2", slot(2, 7, 15)), now(), &store);
    assert_eq!(rejection(result).code(), "off_hours");
}

#[test]
fn window_is_inclusive_of_today_and_two_days_ahead() {
    let store = InMemoryAppointmentRepository::default();
    let policy = AdmissionPolicy::default();
    for days_ahead in 0..=2 {
        let candidate = request(&format!("in-{days_ahead}"), slot(days_ahead, 12, 0));
        assert!(policy.admit(&candidate, now(), &store).is_ok());
    }
    for days_ahead in [-1, 3, 30] {
        let candidate = request(&format!("out-{days_ahead}"), slot(days_ahead, 12, 0));
        let result = policy.admit(&candidate, now(), &store);
        assert!(matches!(
            rejection(result),
            AdmissionRejection::OutOfWindow { .. }
        ));
    }
}

#[test]
fn earlier_hour_today_is_still_admitted() {
    // Only the calendar date is windowed; a slot that already passed today is accepted.
    let store = InMemoryAppointmentRepository::default();
    let result = AdmissionPolicy::default().admit(&request("1", slot(0, 9, 0)), now(), &store);
    assert!(result.is_ok());
}

#[test]
fn only_id_and_slot_clashes_are_conflicts() {
    let store = seeded_store();
    let policy = AdmissionPolicy::default();

    let duplicate = rejection(policy.admit(&request("1", slot(1, 10, 0)), now(), &store));
    let taken = rejection(policy.admit(&request("2", slot(0, 10, 0)), now(), &store));
    let far = rejection(policy.admit(&request("3", slot(4, 10, 0)), now(), &store));
    let late = rejection(policy.admit(&request("4", slot(1, 20, 0)), now(), &store));

    assert!(duplicate.is_conflict());
    assert!(taken.is_conflict());
    assert!(!far.is_conflict());
    assert!(!late.is_conflict());
}
