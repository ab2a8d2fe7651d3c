//! Return builders shared by the integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use tax_core::{FilingStatus, Income, IncomeSource, Owner, Person, TaxReturn, Taxpayer, W2};

pub fn w2(
    owner: Owner,
    wages: Decimal,
    federal_withholding: Decimal,
) -> IncomeSource {
    IncomeSource::Wages(W2 {
        employer: "Acme".to_string(),
        owner,
        wages,
        federal_withholding,
        social_security_wages: wages,
        medicare_wages: wages,
        state_wages: wages,
        ..W2::default()
    })
}

pub fn tax_return(
    tax_year: i32,
    filing_status: FilingStatus,
    sources: Vec<IncomeSource>,
) -> TaxReturn {
    let joint = filing_status.is_joint();
    TaxReturn {
        tax_year,
        taxpayer: Taxpayer {
            filing_status: Some(filing_status),
            primary: Person {
                age: 45,
                ..Person::default()
            },
            spouse: joint.then(|| Person {
                age: 43,
                ..Person::default()
            }),
            lived_with_spouse: joint,
            ..Taxpayer::default()
        },
        income: Income {
            sources,
            ..Income::default()
        },
        ..TaxReturn::default()
    }
}

pub fn single_wages(
    tax_year: i32,
    wages: Decimal,
) -> TaxReturn {
    tax_return(tax_year, FilingStatus::Single, vec![w2(Owner::Primary, wages, Decimal::ZERO)])
}
