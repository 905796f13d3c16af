//! Profiles command - list supported banks and their column layouts

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;
use bankcat_core::AccountFilter;

fn describe_filter(filter: &AccountFilter) -> String {
    let join = |types: &std::collections::BTreeSet<String>| {
        types.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    match filter {
        AccountFilter::Exclude(types) if types.is_empty() => "all accounts".to_string(),
        AccountFilter::Exclude(types) => format!("all except {}", join(types)),
        AccountFilter::AllowOnly(types) => format!("only {}", join(types)),
    }
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let profiles = ctx.registry.profiles();

    if json {
        return output::print_ok(profiles);
    }

    let mut table = output::table(&["Bank", "File type", "Date", "Description", "Amount", "Accounts"]);

    for profile in profiles {
        table.add_row(vec![
            profile.bank.clone(),
            profile.file_type.clone(),
            profile.columns.date.clone(),
            profile.columns.description.join(" + "),
            profile.columns.amount.clone(),
            format!(
                "{} ({})",
                describe_filter(&profile.account_filter),
                profile.account_type_column
            ),
        ]);
    }

    println!("{}", table);

    if let (Some(bank), Some(file_type)) = (&ctx.config.default_bank, &ctx.config.default_file_type) {
        println!();
        println!("Default selection: {} / {}", bank.bold(), file_type.bold());
    }

    Ok(())
}
