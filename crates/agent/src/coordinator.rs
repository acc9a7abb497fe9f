//! Turn coordinator wiring the control core to the business backends
//!
//! Each caller turn runs guardrails first, then dispatches to a handler
//! for the current state. A turn performs at most one caller-visible
//! action; forced escalation paths may chain transitions to reach the
//! escalation state through the defined graph.

use callflow_config::Settings;
use callflow_core::{
    max_severity, ConversationState, SessionData, Severity, TransitionTrigger, ViolationType,
};
use callflow_tools::{
    get_all_services, get_service_details, match_service, AvailabilityCalendar, BookingRequest,
    BookingSystem, CustomerDirectory,
};

use crate::guardrails::GuardrailPipeline;
use crate::slots::{SlotError, SlotManager};
use crate::state_machine::ConversationStateMachine;
use crate::AgentError;

const MAX_INPUT_LENGTH: usize = 500;

const BOOKING_SIGNALS: &[&str] = &[
    "book",
    "appointment",
    "schedule",
    "come out",
    "send someone",
    "fix",
    "repair",
    "install",
    "leak",
    "broken",
    "blocked",
];

const INFO_SIGNALS: &[&str] = &[
    "how much",
    "price",
    "cost",
    "what services",
    "do you offer",
    "hours",
    "area",
    "where",
];

const EMERGENCY_SIGNALS: &[&str] = &[
    "gas leak",
    "burst pipe",
    "flooding",
    "fire",
    "sparking",
    "emergency",
    "urgent",
];

/// Which specialist persona currently fronts the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePersona {
    Intake,
    Booking,
    Info,
    Escalation,
}

impl ActivePersona {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Intake => "IntakeAgent",
            Self::Booking => "BookingAgent",
            Self::Info => "InfoAgent",
            Self::Escalation => "EscalationAgent",
        }
    }
}

/// What the coordinator produced for one caller turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub messages: Vec<String>,
    pub state: ConversationState,
    pub persona: ActivePersona,
}

/// Runs a full conversation against the real state machine, slot
/// manager, guardrails, and mock backends
pub struct TurnCoordinator {
    settings: Settings,
    sm: ConversationStateMachine,
    slots: SlotManager,
    guardrails: GuardrailPipeline,
    session: SessionData,
    calendar: AvailabilityCalendar,
    bookings: BookingSystem,
    customers: CustomerDirectory,
    persona: ActivePersona,
    /// Set when the caller was offered alternative dates; the next turn
    /// routes their pick through a date correction and re-confirmation.
    awaiting_alternative_date: bool,
}

impl TurnCoordinator {
    pub fn new(settings: Settings) -> Self {
        let guardrails = GuardrailPipeline::new(settings.guardrails.confusion_threshold);
        let slots = SlotManager::new(&settings.guardrails);
        Self {
            settings,
            sm: ConversationStateMachine::new(),
            slots,
            guardrails,
            session: SessionData::new(),
            calendar: AvailabilityCalendar::new(),
            bookings: BookingSystem::new(),
            customers: CustomerDirectory::new(),
            persona: ActivePersona::Intake,
            awaiting_alternative_date: false,
        }
    }

    /// Deliver the opening greeting and move past the greeting state
    pub fn greet(&mut self) -> Result<TurnReply, AgentError> {
        self.sm.transition(TransitionTrigger::GreetingDelivered)?;
        Ok(self.reply(vec![format!(
            "Good morning, thanks for calling {}. How can I help you today?",
            self.settings.business.name
        )]))
    }

    /// Process one caller turn and produce the agent's reply
    pub fn process_turn(&mut self, text: &str) -> Result<TurnReply, AgentError> {
        if text.chars().count() > MAX_INPUT_LENGTH {
            return Ok(self.reply(vec![
                "That was quite long. Could you keep it brief for me?".to_string(),
            ]));
        }

        // Guardrails run before any state mutation. Escalate takes
        // precedence over block, block over warning.
        let violations = self
            .guardrails
            .check_user_input(text, self.session.error_count);
        match max_severity(&violations) {
            Some(Severity::Escalate) => {
                let violation = violations
                    .iter()
                    .find(|v| v.severity == Severity::Escalate)
                    .and_then(|v| v.violation_type);
                let mut out = Vec::new();
                self.handle_escalation(violation, text, &mut out)?;
                return Ok(self.reply(out));
            }
            Some(Severity::Block) => {
                return Ok(self.reply(vec![
                    "I can only help with home services like plumbing, electrical, \
                     and HVAC. Is there something along those lines I can help with?"
                        .to_string(),
                ]));
            }
            Some(Severity::Warning) | None => {}
        }

        let mut out = Vec::new();
        match self.sm.current_state() {
            ConversationState::IntentDetection => self.handle_intent(text, &mut out)?,
            ConversationState::ServiceSelection => self.handle_service_selection(text, &mut out)?,
            ConversationState::SlotFilling => self.handle_slot_filling(text, &mut out)?,
            ConversationState::SlotConfirmation => self.handle_confirmation(text, &mut out)?,
            ConversationState::Confirmation => self.handle_post_booking(text, &mut out)?,
            ConversationState::InfoResponse => self.handle_info(text, &mut out)?,
            ConversationState::Escalation => self.handle_escalation_response(&mut out)?,
            ConversationState::ErrorRecovery => self.handle_error_recovery(&mut out)?,
            _ => out.push("I'm sorry, I didn't catch that. Could you repeat that?".to_string()),
        }
        Ok(self.reply(out))
    }

    pub fn current_state(&self) -> ConversationState {
        self.sm.current_state()
    }

    pub fn is_terminal(&self) -> bool {
        self.sm.is_terminal()
    }

    pub fn state_trace(&self) -> Vec<&'static str> {
        self.sm.state_trace()
    }

    pub fn session(&self) -> &SessionData {
        &self.session
    }

    pub fn slots(&self) -> &SlotManager {
        &self.slots
    }

    pub fn persona(&self) -> ActivePersona {
        self.persona
    }

    fn reply(&self, messages: Vec<String>) -> TurnReply {
        // Outgoing replies get the post-model screen; violations in our
        // own templates are an authoring bug, so they are logged rather
        // than suppressed.
        for message in &messages {
            for violation in self.guardrails.check_agent_response(message) {
                tracing::warn!(
                    violation = ?violation.violation_type,
                    detail = ?violation.message,
                    "outgoing reply flagged"
                );
            }
        }
        TurnReply {
            messages,
            state: self.sm.current_state(),
            persona: self.persona,
        }
    }

    fn handoff(&mut self, to: ActivePersona) {
        if self.persona != to {
            tracing::info!(from = self.persona.label(), to = to.label(), "agent handoff");
            self.persona = to;
        }
    }

    fn handle_intent(&mut self, text: &str, out: &mut Vec<String>) -> Result<(), AgentError> {
        let lower = text.to_lowercase();

        if EMERGENCY_SIGNALS.iter().any(|s| lower.contains(s)) {
            return self.handle_escalation(Some(ViolationType::Emergency), text, out);
        }

        if BOOKING_SIGNALS.iter().any(|s| lower.contains(s)) {
            self.sm.transition(TransitionTrigger::IntentBook)?;
            self.session.intent = Some("booking".to_string());
            self.handoff(ActivePersona::Booking);

            // The intent message itself may already name a service.
            if let Some(matched) = match_service(text) {
                self.slots.set_slot("service_type", matched)?;
                self.session.service_type = Some(matched.to_string());
                self.sm.transition(TransitionTrigger::ServiceConfirmed)?;
                out.push(format!(
                    "I can help you book a {} appointment. Could I get your full name please?",
                    matched
                ));
            } else {
                out.push(
                    "I can help you book that. What type of service do you need? \
                     We offer plumbing, electrical, HVAC, drain cleaning, \
                     and general handyman services."
                        .to_string(),
                );
            }
            return Ok(());
        }

        if INFO_SIGNALS.iter().any(|s| lower.contains(s)) {
            self.sm.transition(TransitionTrigger::IntentInfo)?;
            self.session.intent = Some("info".to_string());
            self.handoff(ActivePersona::Info);
            return self.handle_info(text, out);
        }

        out.push(
            "I'd be happy to help! Are you looking to book an appointment, \
             or did you have a question about our services?"
                .to_string(),
        );
        Ok(())
    }

    fn handle_service_selection(
        &mut self,
        text: &str,
        out: &mut Vec<String>,
    ) -> Result<(), AgentError> {
        if let Some(matched) = match_service(text) {
            self.slots.set_slot("service_type", matched)?;
            self.session.service_type = Some(matched.to_string());
            self.sm.transition(TransitionTrigger::ServiceConfirmed)?;
            tracing::debug!(service = matched, "service matched");
            out.push(format!(
                "Got it, {} service. Could I get your full name please?",
                matched
            ));
        } else {
            let names: Vec<&str> = get_all_services().iter().map(|s| s.name).collect();
            out.push(format!(
                "I'm not sure what service that falls under. We offer: {}. Which would you need?",
                names.join(", ")
            ));
        }
        Ok(())
    }

    fn handle_slot_filling(&mut self, text: &str, out: &mut Vec<String>) -> Result<(), AgentError> {
        if self.awaiting_alternative_date {
            return self.handle_alternative_date(text, out);
        }

        let next_slot = match self.slots.next_empty_slot() {
            Some(defn) => defn,
            None => {
                self.sm.transition(TransitionTrigger::AllSlotsFilled)?;
                out.push(self.confirmation_prompt());
                return Ok(());
            }
        };

        let slot_name = next_slot.name;
        match self.slots.set_slot(slot_name, text) {
            Ok(msg) => {
                tracing::debug!(slot = slot_name, %msg, "slot filled");
                self.record_session_slot(slot_name);
                if self.slots.all_required_filled() {
                    self.sm.transition(TransitionTrigger::AllSlotsFilled)?;
                    out.push(self.confirmation_prompt());
                } else if let Some(next) = self.slots.next_empty_slot() {
                    out.push(format!("Got it. And {}?", next.prompt_hint.to_lowercase()));
                } else {
                    out.push(
                        "Can you briefly describe the issue? Or I can skip that.".to_string(),
                    );
                }
                Ok(())
            }
            Err(rejection @ SlotError::ValidationRejected { .. }) => {
                if self.slots.has_exceeded_retries(slot_name)? {
                    self.session.error_count += 1;
                    self.sm.transition(TransitionTrigger::MaxRetries)?;
                    out.push(
                        "I'm having trouble with that. Let me connect you with a team member."
                            .to_string(),
                    );
                    return Ok(());
                }
                out.push(format!("Sorry, {} Could you try again?", rejection));
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The caller is replying to an offer of alternative dates. Their pick
    /// replaces the unavailable date as a correction and goes back through
    /// the read-back gate before any booking runs.
    fn handle_alternative_date(
        &mut self,
        text: &str,
        out: &mut Vec<String>,
    ) -> Result<(), AgentError> {
        match self.slots.correct_slot("preferred_date", text) {
            Ok(_) => {
                self.awaiting_alternative_date = false;
                self.record_session_slot("preferred_date");
                self.sm.transition(TransitionTrigger::AllSlotsFilled)?;
                out.push(self.confirmation_prompt());
                Ok(())
            }
            Err(SlotError::ValidationRejected { .. }) => {
                if self.slots.has_exceeded_retries("preferred_date")? {
                    self.session.error_count += 1;
                    self.awaiting_alternative_date = false;
                    self.sm.transition(TransitionTrigger::MaxRetries)?;
                    out.push(
                        "I'm having trouble with that. Let me connect you with a team member."
                            .to_string(),
                    );
                    return Ok(());
                }
                out.push(
                    "Sorry, I need the date as year-month-day. Which of those openings works?"
                        .to_string(),
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn record_session_slot(&mut self, slot_name: &str) {
        let value = self.slots.slot_value(slot_name).map(str::to_string);
        match slot_name {
            "customer_name" => self.session.customer_name = value,
            "customer_phone" => {
                if let Some(phone) = &value {
                    if let Some(record) = self.customers.lookup_customer(phone) {
                        tracing::info!(
                            name = %record.name,
                            previous_bookings = record.previous_bookings,
                            "returning customer identified"
                        );
                    }
                }
                self.session.customer_phone = value;
            }
            "customer_address" => self.session.customer_address = value,
            "service_type" => self.session.service_type = value,
            "preferred_date" => self.session.preferred_date = value,
            "preferred_time" => self.session.preferred_time = value,
            _ => {}
        }
    }

    fn confirmation_prompt(&self) -> String {
        format!(
            "{}\n\nDoes everything sound correct?",
            self.slots.confirmation_summary()
        )
    }

    fn handle_confirmation(&mut self, text: &str, out: &mut Vec<String>) -> Result<(), AgentError> {
        let lower = text.to_lowercase();

        let yes = ["yes", "correct", "right", "yep", "yeah", "looks good"];
        if yes.iter().any(|w| lower.contains(w)) {
            self.slots.confirm_all();
            if !self.slots.all_confirmed() {
                // A required slot never passed validation; reopen
                // collection rather than book incomplete details.
                self.sm.transition(TransitionTrigger::CallerCorrected)?;
                out.push(
                    "I'm still missing some details before I can book that. \
                     Let's go over them again."
                        .to_string(),
                );
                return Ok(());
            }
            self.sm.transition(TransitionTrigger::CallerConfirmed)?;
            tracing::debug!("caller confirmed, checking availability");
            return self.do_availability_and_book(out);
        }

        let no = ["no", "wrong", "change", "actually", "correction"];
        if no.iter().any(|w| lower.contains(w)) {
            self.sm.transition(TransitionTrigger::CallerCorrected)?;
            out.push("No problem. Which detail needs to be changed?".to_string());
            return Ok(());
        }

        out.push("Sorry, I just need a yes or no. Does everything look right?".to_string());
        Ok(())
    }

    fn do_availability_and_book(&mut self, out: &mut Vec<String>) -> Result<(), AgentError> {
        // Booking must never run on unconfirmed details, whatever path
        // led here.
        if !self.slots.all_confirmed() {
            return Err(AgentError::UnconfirmedBooking);
        }

        let slot_data = self.slots.to_map();
        let service = slot_data
            .get("service_type")
            .map(String::as_str)
            .unwrap_or("general handyman")
            .to_string();
        let date = slot_data
            .get("preferred_date")
            .map(String::as_str)
            .unwrap_or("")
            .to_string();
        let time = slot_data.get("preferred_time").map(String::as_str);

        let avail = self.calendar.check_availability(&service, &date, time);

        if !avail.available {
            let alt_dates = self.calendar.available_dates(3);
            if !alt_dates.is_empty() {
                self.sm.transition(TransitionTrigger::NoAvailability)?;
                self.awaiting_alternative_date = true;
                let options: Vec<String> = alt_dates
                    .iter()
                    .map(|d| format!("{} ({})", d.date, d.day_name))
                    .collect();
                out.push(format!(
                    "Unfortunately {} isn't available. I have openings on: {}. \
                     Which works for you?",
                    date,
                    options.join(", ")
                ));
            } else {
                self.sm.transition(TransitionTrigger::NoAvailabilityAtAll)?;
                out.push(
                    "I'm sorry, we don't have any availability in the coming days. \
                     Let me connect you with the team to find a solution."
                        .to_string(),
                );
            }
            return Ok(());
        }

        self.sm.transition(TransitionTrigger::TimeSelected)?;
        let selected = &avail.slots[0];
        let result = self.bookings.create_booking(BookingRequest {
            name: slot_data.get("customer_name").cloned().unwrap_or_default(),
            phone: slot_data.get("customer_phone").cloned().unwrap_or_default(),
            service,
            date: selected.date.clone(),
            time: selected.time.clone(),
            address: slot_data
                .get("customer_address")
                .cloned()
                .unwrap_or_default(),
            description: slot_data.get("job_description").cloned(),
            technician: Some(selected.technician.clone()),
        });

        if result.success {
            self.session.booking_ref = result.booking_ref.clone();
            self.sm.transition(TransitionTrigger::BookingSuccess)?;
            out.push(format!(
                "Booking confirmed! Your reference number is {}. \
                 {} will be at your address on {} at {}. \
                 Is there anything else I can help with?",
                result.booking_ref.as_deref().unwrap_or("unknown"),
                selected.technician,
                selected.date,
                selected.time
            ));
        } else {
            self.sm.transition(TransitionTrigger::BookingFailed)?;
            out.push(
                "Something went wrong creating the booking. Let me connect you with our team."
                    .to_string(),
            );
        }
        Ok(())
    }

    fn handle_post_booking(&mut self, text: &str, out: &mut Vec<String>) -> Result<(), AgentError> {
        let lower = text.to_lowercase();
        let closing = ["no", "nothing", "that's all", "bye", "thanks", "thank"];
        if closing.iter().any(|w| lower.contains(w)) {
            self.sm.transition(TransitionTrigger::Goodbye)?;
            let name = self.session.customer_name.as_deref().unwrap_or("there");
            out.push(format!(
                "Thanks for calling {}, {}. Have a great day!",
                self.settings.business.name, name
            ));
        } else {
            out.push("Is there anything else I can help you with?".to_string());
        }
        Ok(())
    }

    fn handle_info(&mut self, text: &str, out: &mut Vec<String>) -> Result<(), AgentError> {
        let lower = text.to_lowercase();

        if let Some(matched) = match_service(text) {
            if let Some(details) = get_service_details(matched) {
                out.push(format!(
                    "Our {} covers {} Pricing typically runs {} with a {} call-out fee. \
                     Most jobs take {}. Would you like to book an appointment?",
                    details.name,
                    details.description,
                    details.price_range,
                    details.call_out_fee,
                    details.typical_duration
                ));
                return Ok(());
            }
        }

        if ["all services", "what do you offer", "list"]
            .iter()
            .any(|w| lower.contains(w))
        {
            let lines: Vec<String> = get_all_services()
                .iter()
                .map(|s| format!("{} ({})", s.name, s.price_range))
                .collect();
            out.push(format!(
                "We offer: {}. Would you like details on any of these, or to book?",
                lines.join(", ")
            ));
            return Ok(());
        }

        if ["book", "appointment", "schedule", "yes"]
            .iter()
            .any(|w| lower.contains(w))
        {
            self.sm.transition(TransitionTrigger::WantsToBook)?;
            self.handoff(ActivePersona::Booking);
            out.push("I'll get you booked in. What type of service do you need?".to_string());
            return Ok(());
        }

        if ["no", "that's all", "bye", "thanks"]
            .iter()
            .any(|w| lower.contains(w))
        {
            self.sm.transition(TransitionTrigger::Satisfied)?;
            out.push(format!(
                "Thanks for calling {}. Have a great day!",
                self.settings.business.name
            ));
            return Ok(());
        }

        out.push(
            "I can help with pricing, service details, or booking. What would you like to know?"
                .to_string(),
        );
        Ok(())
    }

    fn handle_escalation(
        &mut self,
        reason: Option<ViolationType>,
        text: &str,
        out: &mut Vec<String>,
    ) -> Result<(), AgentError> {
        // Reach the escalation state through the defined graph; some
        // states need an intermediate hop.
        match self.sm.current_state() {
            ConversationState::Escalation => {}
            ConversationState::IntentDetection => {
                self.sm.transition(TransitionTrigger::IntentEmergency)?;
            }
            ConversationState::SlotFilling => {
                self.sm.transition(TransitionTrigger::MaxRetries)?;
                self.sm.transition(TransitionTrigger::RecoveryFailed)?;
            }
            ConversationState::ErrorRecovery => {
                self.sm.transition(TransitionTrigger::RecoveryFailed)?;
            }
            state => {
                tracing::warn!(
                    state = %state,
                    valid = ?self.sm.valid_triggers(),
                    "cannot escalate from this state"
                );
            }
        }

        self.handoff(ActivePersona::Escalation);
        tracing::info!(?reason, "escalation triggered");

        if reason == Some(ViolationType::Emergency) {
            let lower = text.to_lowercase();
            if lower.contains("gas") {
                out.push(format!(
                    "If you smell gas, leave the area immediately and don't operate \
                     any electrical switches. Call our emergency line at {} from outside. \
                     If the smell is strong, call 000.",
                    self.settings.business.emergency_line
                ));
            } else if lower.contains("flood") || lower.contains("water") || lower.contains("burst")
            {
                out.push(format!(
                    "Please turn off your main water supply if you can safely reach it. \
                     Then call our emergency line at {}. \
                     We'll have someone out to you as quickly as possible.",
                    self.settings.business.emergency_line
                ));
            } else {
                out.push(format!(
                    "I understand this is urgent. Please call our emergency line at {} \
                     for immediate assistance. A team member will also call you back \
                     within {} minutes.",
                    self.settings.business.emergency_line,
                    self.settings.business.callback_sla_minutes
                ));
            }
        } else {
            out.push(format!(
                "I understand. Let me connect you with a team member. \
                 Someone will call you back within {} minutes. \
                 Can I confirm the best number to reach you?",
                self.settings.business.callback_sla_minutes
            ));
        }
        Ok(())
    }

    fn handle_escalation_response(&mut self, out: &mut Vec<String>) -> Result<(), AgentError> {
        self.sm.transition(TransitionTrigger::HandoffComplete)?;
        out.push(format!(
            "We've noted your details. A team member from {} will be in touch shortly. \
             Stay safe and have a good day.",
            self.settings.business.name
        ));
        Ok(())
    }

    fn handle_error_recovery(&mut self, out: &mut Vec<String>) -> Result<(), AgentError> {
        self.sm.transition(TransitionTrigger::CorrectionReceived)?;
        let prompt = self
            .slots
            .next_empty_slot()
            .map(|defn| defn.prompt_hint.to_string())
            .unwrap_or_else(|| "Let's continue.".to_string());
        out.push(format!("Let me try that again. {}", prompt));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> TurnCoordinator {
        TurnCoordinator::new(Settings::default())
    }

    #[test]
    fn test_greet_moves_to_intent_detection() {
        let mut tc = coordinator();
        let reply = tc.greet().unwrap();
        assert_eq!(reply.state, ConversationState::IntentDetection);
        assert!(reply.messages[0].contains("Reliable Home Services"));
    }

    #[test]
    fn test_overlong_input_is_deflected() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        let reply = tc.process_turn(&"a".repeat(600)).unwrap();
        assert!(reply.messages[0].contains("brief"));
        assert_eq!(reply.state, ConversationState::IntentDetection);
    }

    #[test]
    fn test_booking_intent_with_service_skips_selection() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        let reply = tc.process_turn("I need to book a plumber").unwrap();
        assert_eq!(reply.state, ConversationState::SlotFilling);
        assert_eq!(reply.persona, ActivePersona::Booking);
        assert_eq!(tc.session().service_type.as_deref(), Some("plumbing"));
    }

    #[test]
    fn test_unclear_intent_stays_put() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        let reply = tc.process_turn("hmm well you see").unwrap();
        assert_eq!(reply.state, ConversationState::IntentDetection);
        assert!(reply.messages[0].contains("book an appointment"));
    }

    #[test]
    fn test_off_topic_input_is_blocked_without_mutation() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        let reply = tc
            .process_turn("What do you think about cryptocurrency?")
            .unwrap();
        assert!(reply.messages[0].contains("home services"));
        assert_eq!(reply.state, ConversationState::IntentDetection);
        assert!(tc.session().intent.is_none());
    }

    #[test]
    fn test_booking_refuses_unconfirmed_slots() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        tc.process_turn("I need to book a plumber").unwrap();

        let mut out = Vec::new();
        let err = tc.do_availability_and_book(&mut out).unwrap_err();
        assert!(matches!(err, AgentError::UnconfirmedBooking));
        assert!(out.is_empty());
    }

    #[test]
    fn test_confirmation_reopens_when_a_slot_never_validated() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        tc.process_turn("I need to book a plumber").unwrap();
        tc.process_turn("John Smith").unwrap();
        // Phone fails validation once and is then skipped past.
        tc.process_turn("12").unwrap();
        tc.process_turn("2025-03-15").unwrap();
        tc.process_turn("10:00").unwrap();
        tc.process_turn("42 Wallaby Way, Sydney").unwrap();
        tc.process_turn("Leaking tap").unwrap();
        assert_eq!(tc.current_state(), ConversationState::SlotConfirmation);

        let reply = tc.process_turn("yes").unwrap();
        assert_eq!(reply.state, ConversationState::SlotFilling);
        assert!(reply.messages[0].contains("missing"));
        assert!(!tc.slots().all_confirmed());
        assert!(tc.session().booking_ref.is_none());
    }

    #[test]
    fn test_emergency_input_escalates_immediately() {
        let mut tc = coordinator();
        tc.greet().unwrap();
        let reply = tc.process_turn("I have a gas leak!").unwrap();
        assert_eq!(reply.state, ConversationState::Escalation);
        assert_eq!(reply.persona, ActivePersona::Escalation);
        assert!(reply.messages[0].contains("1300-555-000"));
        assert!(reply.messages[0].contains("000"));
    }
}
