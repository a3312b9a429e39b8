//! Test Data Builders
//!
//! Provides builder patterns for constructing test ledgers with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::NaiveDate;
use core_kernel::{MemberId, Money, PledgeId};
use domain_pledge::{
    reconcile, Frequency, NewPayment, PaymentMethod, PledgeLedger, PledgeSchedule,
};

use crate::fixtures::{MoneyFixtures, TemporalFixtures};

/// Builder for constructing test pledge ledgers
pub struct TestLedgerBuilder {
    pledge_id: PledgeId,
    member_id: Option<MemberId>,
    total: Money,
    installments: u32,
    frequency: Frequency,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    next_due_date: Option<Option<NaiveDate>>,
    payments: Vec<Money>,
}

impl Default for TestLedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLedgerBuilder {
    /// Creates a builder for a 10,000.00 GHS pledge in 10 monthly installments
    pub fn new() -> Self {
        Self {
            pledge_id: PledgeId::new(),
            member_id: None,
            total: MoneyFixtures::pledge_total(),
            installments: 10,
            frequency: Frequency::Monthly,
            start_date: TemporalFixtures::pledge_start(),
            end_date: None,
            next_due_date: None,
            payments: Vec::new(),
        }
    }

    /// Sets the pledge ID
    pub fn with_pledge_id(mut self, id: PledgeId) -> Self {
        self.pledge_id = id;
        self
    }

    /// Sets the pledging member
    pub fn with_member(mut self, id: MemberId) -> Self {
        self.member_id = Some(id);
        self
    }

    /// Sets the pledge total
    pub fn with_total(mut self, total: Money) -> Self {
        self.total = total;
        self
    }

    /// Sets the installment plan
    pub fn with_installments(mut self, installments: u32, frequency: Frequency) -> Self {
        self.installments = installments;
        self.frequency = frequency;
        self
    }

    /// Sets the start date
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Sets the end date
    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Overrides the next due date (defaults to the start date)
    pub fn with_next_due_date(mut self, date: Option<NaiveDate>) -> Self {
        self.next_due_date = Some(date);
        self
    }

    /// Adds a cash payment applied through `reconcile`
    pub fn with_payment(mut self, amount: Money) -> Self {
        self.payments.push(amount);
        self
    }

    /// Returns the schedule the builder would use
    pub fn schedule(&self) -> PledgeSchedule {
        let mut schedule = PledgeSchedule::new(self.installments, self.frequency, self.start_date);
        if let Some(end) = self.end_date {
            schedule = schedule.with_end_date(end);
        }
        if let Some(next_due) = self.next_due_date {
            schedule = schedule.with_next_due_date(next_due);
        }
        schedule
    }

    /// Builds the ledger, applying any payments in order
    ///
    /// # Panics
    ///
    /// Panics if the ledger or a payment is invalid
    pub fn build(self) -> PledgeLedger {
        let mut ledger = PledgeLedger::new(self.pledge_id, self.total, self.schedule())
            .expect("valid test ledger");
        if let Some(member_id) = self.member_id {
            ledger = ledger.with_member(member_id);
        }

        for amount in self.payments {
            let payment = NewPayment {
                amount,
                method: PaymentMethod::Cash,
                date: self.start_date,
                notes: None,
            };
            let (updated, _) = reconcile(&ledger, payment, TemporalFixtures::march_sunday_instant())
                .expect("valid test payment");
            ledger = updated;
        }

        ledger
    }
}

/// Creates a cash payment request for `amount` on the fixture date
pub fn cash_payment(amount: Money) -> NewPayment {
    NewPayment {
        amount,
        method: PaymentMethod::Cash,
        date: TemporalFixtures::march_sunday(),
        notes: None,
    }
}
