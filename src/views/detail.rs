//! Plain-text renderings of single records and list rows.

use std::fmt;

use crate::format::format_identifier;
use crate::models::{AccountKind, Customer, Router};

/// Detail view of a customer, identifiers in display form.
pub struct CustomerDetail<'a>(pub &'a Customer);

impl fmt::Display for CustomerDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        writeln!(f, "Customer #{}", c.id)?;
        writeln!(f, "  Name:        {}", c.full_name)?;
        writeln!(f, "  Account:     {}", c.account_type)?;
        let label = match c.account_type {
            AccountKind::Individual => "CPF",
            AccountKind::Organization => "CNPJ",
        };
        writeln!(
            f,
            "  {:<12} {}",
            format!("{}:", label),
            format_identifier(c.account_type, c.identifier()).unwrap_or_else(|| "-".to_string())
        )?;
        if let Some(birth) = c.birth_date() {
            writeln!(f, "  Birth:       {}", birth.format("%d/%m/%Y"))?;
        }
        write!(f, "  Address:     {}, {}", c.street, c.number)?;
        if !c.complement.is_empty() {
            write!(f, " ({})", c.complement)?;
        }
        writeln!(f)?;
        writeln!(f, "               {} - {} - CEP {}", c.district, c.city, c.cep)?;
        writeln!(f, "  Status:      {}", status(c.inactive))?;
        match &c.router {
            Some(router) => writeln!(
                f,
                "  Router:      #{} {} {} ({})",
                router.id, router.brand, router.model, router.address_ip
            ),
            None => writeln!(f, "  Router:      -"),
        }
    }
}

/// Detail view of a router with its customers.
pub struct RouterDetail<'a>(pub &'a Router);

impl fmt::Display for RouterDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "Router #{}", r.id)?;
        writeln!(f, "  Brand/model: {} {}", r.brand, r.model)?;
        writeln!(f, "  IPv4:        {}", r.address_ip)?;
        writeln!(f, "  IPv6:        {}", r.address_ipv6)?;
        writeln!(f, "  Status:      {}", status(r.inactive))?;
        if r.customers.is_empty() {
            return writeln!(f, "  Customers:   -");
        }
        writeln!(f, "  Customers:")?;
        for customer in &r.customers {
            writeln!(f, "    #{} {}", customer.id, customer.full_name)?;
        }
        Ok(())
    }
}

/// One line of the customer list.
pub fn customer_row(c: &Customer) -> String {
    format!(
        "{:>5}  {:<32} {:<20} {}",
        c.id,
        c.full_name,
        format_identifier(c.account_type, c.identifier()).unwrap_or_default(),
        status(c.inactive)
    )
}

/// One line of the router list.
pub fn router_row(r: &Router) -> String {
    format!(
        "{:>5}  {:<16} {:<16} {:<15} {:>3} customer(s)  {}",
        r.id,
        r.brand,
        r.model,
        r.address_ip,
        r.customers.len(),
        status(r.inactive)
    )
}

fn status(inactive: bool) -> &'static str {
    if inactive {
        "inactive"
    } else {
        "active"
    }
}
