use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use super::load_data_source;
use crate::data::DataAccess;
use crate::io::output::write_customer_list;

pub fn list_customers(data: Option<&Path>) -> Result<()> {
    let source = load_data_source(data, Utc::now())?;
    let customers = source.list_customers();
    if customers.is_empty() {
        println!("No customers in dataset");
        return Ok(());
    }
    write_customer_list(&mut std::io::stdout().lock(), &customers)
}
