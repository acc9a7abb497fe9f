//! End-to-end conversation flows through the turn coordinator

use callflow_agent::{ActivePersona, TurnCoordinator};
use callflow_config::Settings;
use callflow_core::ConversationState;

fn coordinator() -> TurnCoordinator {
    TurnCoordinator::new(Settings::default())
}

#[test]
fn happy_path_booking_reaches_confirmation_gate() {
    let mut tc = coordinator();
    tc.greet().unwrap();

    tc.process_turn("I need to book a plumber").unwrap();
    assert_eq!(tc.current_state(), ConversationState::SlotFilling);

    tc.process_turn("John Smith").unwrap();
    tc.process_turn("0412 345 678").unwrap();
    tc.process_turn("2025-03-15").unwrap();
    tc.process_turn("10:00").unwrap();
    let reply = tc.process_turn("42 Wallaby Way, Sydney").unwrap();

    // All six required slots are filled; the read-back gate opens.
    assert_eq!(reply.state, ConversationState::SlotConfirmation);
    let summary = &reply.messages[0];
    assert!(summary.contains("John Smith"));
    assert!(summary.contains("0412345678"));
    assert!(summary.contains("plumbing"));
    assert!(summary.contains("2025-03-15"));
    assert!(summary.contains("10:00"));
    assert!(summary.contains("42 Wallaby Way, Sydney"));

    assert!(tc.slots().all_required_filled());
    assert!(!tc.slots().all_confirmed());
}

#[test]
fn caller_confirmation_confirms_slots_and_checks_availability() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I need to book a plumber").unwrap();
    tc.process_turn("John Smith").unwrap();
    tc.process_turn("0412345678").unwrap();
    tc.process_turn("2025-03-15").unwrap();
    tc.process_turn("10:00").unwrap();
    tc.process_turn("42 Wallaby Way, Sydney").unwrap();

    let reply = tc.process_turn("yes, that's right").unwrap();
    assert!(tc.slots().all_confirmed());
    // A fixed past date is never on the rolling schedule, so the
    // coordinator offers alternatives and reopens slot filling.
    assert_eq!(reply.state, ConversationState::SlotFilling);
    assert!(reply.messages[0].contains("openings"));
}

#[test]
fn alternative_date_choice_replaces_unavailable_date_and_books() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I need to book a plumber").unwrap();
    tc.process_turn("John Smith").unwrap();
    tc.process_turn("0412345678").unwrap();
    tc.process_turn("2020-01-01").unwrap();
    tc.process_turn("10:00").unwrap();
    tc.process_turn("42 Wallaby Way, Sydney").unwrap();

    let reply = tc.process_turn("yes").unwrap();
    assert_eq!(reply.state, ConversationState::SlotFilling);
    let offer = reply.messages[0].clone();
    let marker = "openings on: ";
    let start = offer.find(marker).expect("alternatives offered") + marker.len();
    let alt_date = offer[start..start + 10].to_string();

    // The pick replaces the stale date and reopens the read-back gate.
    let reply = tc.process_turn(&alt_date).unwrap();
    assert_eq!(reply.state, ConversationState::SlotConfirmation);
    assert!(reply.messages[0].contains(&alt_date));
    assert!(!reply.messages[0].contains("2020-01-01"));
    assert_eq!(tc.session().preferred_date.as_deref(), Some(alt_date.as_str()));
    assert!(!tc.slots().all_confirmed());

    // Re-confirming books on the newly chosen date.
    let reply = tc.process_turn("yes").unwrap();
    assert_eq!(reply.state, ConversationState::Confirmation);
    assert!(tc.session().booking_ref.is_some());
    assert!(reply.messages[0].contains(&alt_date));
}

#[test]
fn vague_alternative_date_reply_is_reprompted() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I need to book a plumber").unwrap();
    tc.process_turn("John Smith").unwrap();
    tc.process_turn("0412345678").unwrap();
    tc.process_turn("2020-01-01").unwrap();
    tc.process_turn("10:00").unwrap();
    tc.process_turn("42 Wallaby Way, Sydney").unwrap();

    let reply = tc.process_turn("yes").unwrap();
    let offer = reply.messages[0].clone();
    let marker = "openings on: ";
    let start = offer.find(marker).expect("alternatives offered") + marker.len();
    let alt_date = offer[start..start + 10].to_string();

    let reply = tc.process_turn("whichever is soonest").unwrap();
    assert_eq!(reply.state, ConversationState::SlotFilling);
    assert!(reply.messages[0].contains("year-month-day"));

    let reply = tc.process_turn(&alt_date).unwrap();
    assert_eq!(reply.state, ConversationState::SlotConfirmation);
    assert!(reply.messages[0].contains(&alt_date));
}

#[test]
fn caller_correction_reopens_slot_filling() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I need to book a plumber").unwrap();
    tc.process_turn("John Smith").unwrap();
    tc.process_turn("0412345678").unwrap();
    tc.process_turn("2025-03-15").unwrap();
    tc.process_turn("10:00").unwrap();
    tc.process_turn("42 Wallaby Way, Sydney").unwrap();
    assert_eq!(tc.current_state(), ConversationState::SlotConfirmation);

    let reply = tc.process_turn("no, the date is wrong").unwrap();
    assert_eq!(reply.state, ConversationState::SlotFilling);
    assert!(reply.messages[0].contains("Which detail"));
    assert!(!tc.slots().all_confirmed());
}

#[test]
fn emergency_escalates_and_hands_off() {
    let mut tc = coordinator();
    tc.greet().unwrap();

    let reply = tc.process_turn("I have a gas leak!").unwrap();
    assert_eq!(reply.state, ConversationState::Escalation);
    assert_eq!(reply.persona, ActivePersona::Escalation);
    assert!(reply.messages[0].contains("emergency line"));

    let reply = tc.process_turn("0400111222").unwrap();
    assert_eq!(reply.state, ConversationState::Farewell);
    assert!(tc.is_terminal());
    assert_eq!(
        tc.state_trace(),
        vec!["greeting", "intent_detection", "escalation", "farewell"]
    );
}

#[test]
fn frustration_during_slot_filling_forces_escalation() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I need to book a plumber").unwrap();
    assert_eq!(tc.current_state(), ConversationState::SlotFilling);

    let reply = tc.process_turn("This is ridiculous, get me a manager").unwrap();
    assert_eq!(reply.state, ConversationState::Escalation);
    assert_eq!(reply.persona, ActivePersona::Escalation);
    // Forced path routes through error recovery.
    assert_eq!(
        tc.state_trace(),
        vec![
            "greeting",
            "intent_detection",
            "service_selection",
            "slot_filling",
            "error_recovery",
            "escalation",
        ]
    );
}

#[test]
fn info_flow_answers_and_closes() {
    let mut tc = coordinator();
    tc.greet().unwrap();

    let reply = tc.process_turn("How much does electrical work cost?").unwrap();
    assert_eq!(reply.state, ConversationState::InfoResponse);
    assert_eq!(reply.persona, ActivePersona::Info);
    assert!(reply.messages[0].contains("Electrical Service"));
    assert!(reply.messages[0].contains("$150 - $400"));

    let reply = tc.process_turn("What about plumbing?").unwrap();
    assert!(reply.messages[0].contains("Plumbing Service"));

    let reply = tc.process_turn("nothing else, goodbye").unwrap();
    assert_eq!(reply.state, ConversationState::Farewell);
    assert!(tc.is_terminal());
}

#[test]
fn info_flow_can_pivot_to_booking() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("What are your hours?").unwrap();
    assert_eq!(tc.current_state(), ConversationState::InfoResponse);

    let reply = tc.process_turn("Can you book me in?").unwrap();
    assert_eq!(reply.state, ConversationState::ServiceSelection);
    assert_eq!(reply.persona, ActivePersona::Booking);
}

#[test]
fn off_topic_block_does_not_mutate_state() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I need to book a plumber").unwrap();
    let before = tc.state_trace().len();

    let reply = tc.process_turn("Any advice on cryptocurrency?").unwrap();
    assert_eq!(reply.state, ConversationState::SlotFilling);
    assert_eq!(tc.state_trace().len(), before);
}

#[test]
fn unknown_service_lists_catalog() {
    let mut tc = coordinator();
    tc.greet().unwrap();
    tc.process_turn("I want to schedule something").unwrap();
    assert_eq!(tc.current_state(), ConversationState::ServiceSelection);

    let reply = tc.process_turn("pool cleaning").unwrap();
    assert_eq!(reply.state, ConversationState::ServiceSelection);
    assert!(reply.messages[0].contains("General Handyman"));
}
