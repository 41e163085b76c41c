use bloodbank_core::compatibility::{
    compatible_donors_lenient, compatible_recipients_lenient, is_compatible_lenient,
};
use bloodbank_core::identifiers::generate_bag_number;
use bloodbank_core::lifecycle::{
    calculate_expiry_date_lenient, calculate_next_eligible_date, is_donor_eligible,
};
use bloodbank_core::models::{BloodUnit, TransfusionRequest, UnitStatus};
use bloodbank_core::repositories::requests::NewRequest;
use bloodbank_core::{
    BagNumber, BloodBankService, BloodType, ComponentType, CoreConfig, NonEmptyText, Priority,
    RecordId,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bloodbank")]
#[command(about = "Hospital blood bank CLI")]
struct Cli {
    /// Storage root for donor, inventory and request records
    #[arg(long, global = true, env = "BLOODBANK_DATA_DIR")]
    data_dir: Option<String>,

    /// Facility label recorded in configuration
    #[arg(long, global = true, env = "BLOODBANK_FACILITY")]
    facility: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a donor blood type may be given to a recipient
    Compatible {
        /// Recipient blood type, e.g. AB+
        recipient: String,
        /// Donor blood type, e.g. O-
        donor: String,
        /// Component label, e.g. packed_rbc
        component: String,
    },
    /// List donor blood types acceptable for a recipient
    DonorsFor {
        recipient: String,
        component: String,
    },
    /// List recipient blood types that may receive a donor type
    RecipientsFor {
        donor: String,
        component: String,
    },
    /// Compute a unit's expiry date
    Expiry {
        /// Collection date (YYYY-MM-DD)
        #[arg(value_parser = parse_day)]
        collection_date: DateTime<Utc>,
        component: String,
    },
    /// Check donor eligibility as of today
    Eligibility {
        /// Last donation date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        last_donation: Option<DateTime<Utc>>,
    },
    /// Generate a bag number
    BagNumber,
    /// Register a donor
    RegisterDonor {
        name: String,
        blood_type: BloodType,
        /// Last donation date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        last_donation: Option<DateTime<Utc>>,
        #[arg(long)]
        contact: Option<String>,
    },
    /// List registered donors
    Donors {
        /// Only donors of this blood type
        #[arg(long)]
        blood_type: Option<BloodType>,
    },
    /// List donations, most recent first
    Donations {
        /// Only donations from this donor
        #[arg(long)]
        donor: Option<RecordId>,
    },
    /// Record a donation and take the unit into stock
    Donate {
        /// Donor id
        donor_id: RecordId,
        component: ComponentType,
        #[arg(long, default_value_t = 450)]
        volume_ml: u32,
    },
    /// Take an externally sourced unit into stock
    AddUnit {
        blood_type: BloodType,
        component: ComponentType,
        /// Collection date (YYYY-MM-DD)
        #[arg(value_parser = parse_day)]
        collection_date: DateTime<Utc>,
        #[arg(long, default_value_t = 450)]
        volume_ml: u32,
    },
    /// List units, or usable stock per blood type and component
    Inventory {
        /// Only units with this status
        #[arg(long)]
        status: Option<UnitStatus>,
        /// Only units still in circulation
        #[arg(long)]
        active: bool,
        /// Show stock levels instead of units
        #[arg(long, conflicts_with_all = ["status", "active"])]
        summary: bool,
    },
    /// Open a transfusion request
    Request {
        patient_ref: String,
        recipient: BloodType,
        component: ComponentType,
        #[arg(long, default_value_t = 1)]
        units: u32,
        #[arg(long, default_value = "routine")]
        priority: Priority,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List requests, most urgent first
    Requests {
        /// Only requests that can still receive units
        #[arg(long)]
        open: bool,
    },
    /// List issuable units for a request
    Candidates { request_id: RecordId },
    /// Reserve a unit for a request
    Reserve {
        request_id: RecordId,
        bag_number: BagNumber,
    },
    /// Issue a unit against a request
    Issue {
        request_id: RecordId,
        bag_number: BagNumber,
    },
    /// Cancel a request and release its reservations
    Cancel { request_id: RecordId },
    /// Record a transfusion of an issued unit
    Transfuse {
        request_id: RecordId,
        bag_number: BagNumber,
        #[arg(long)]
        adverse_reaction: Option<String>,
    },
    /// List recorded transfusions, most recent first
    Transfusions {
        /// Only transfusions against this request
        #[arg(long)]
        request: Option<RecordId>,
    },
    /// Discard expired units still in stock
    DiscardExpired,
}

fn parse_day(input: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date: {input}"))
}

fn format_day(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn join(blood_types: Vec<BloodType>) -> String {
    blood_types
        .iter()
        .map(BloodType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_unit(unit: &BloodUnit) {
    println!(
        "{}  {:<3} {:<20} {:<10} expires {}  {} ml",
        unit.bag_number,
        unit.blood_type,
        unit.component_type,
        unit.status,
        format_day(unit.expiry_date),
        unit.volume_ml
    );
}

fn print_request(request: &TransfusionRequest) {
    println!(
        "{}  {:<8} {:<3} {:<20} {}/{} issued  {}",
        request.id,
        request.priority,
        request.recipient_blood_type,
        request.component_type,
        request.units_issued,
        request.units_requested,
        request.status
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bloodbank_core=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = || -> Result<BloodBankService, Box<dyn std::error::Error>> {
        let cfg = CoreConfig::from_values(cli.data_dir.clone(), cli.facility.clone())?;
        Ok(BloodBankService::new(Arc::new(cfg))?)
    };

    match cli.command {
        Some(Commands::Compatible {
            ref recipient,
            ref donor,
            ref component,
        }) => {
            let verdict = if is_compatible_lenient(recipient, donor, component) {
                "compatible"
            } else {
                "incompatible"
            };
            println!("{donor} -> {recipient} ({component}): {verdict}");
        }
        Some(Commands::DonorsFor {
            ref recipient,
            ref component,
        }) => {
            println!("{}", join(compatible_donors_lenient(recipient, component)));
        }
        Some(Commands::RecipientsFor {
            ref donor,
            ref component,
        }) => {
            println!("{}", join(compatible_recipients_lenient(donor, component)));
        }
        Some(Commands::Expiry {
            collection_date,
            ref component,
        }) => {
            let expiry = calculate_expiry_date_lenient(collection_date, component);
            println!("{}", format_day(expiry));
        }
        Some(Commands::Eligibility { last_donation }) => {
            if is_donor_eligible(last_donation) {
                println!("eligible");
            } else if let Some(last) = last_donation {
                println!(
                    "not eligible until {}",
                    format_day(calculate_next_eligible_date(last))
                );
            }
        }
        Some(Commands::BagNumber) => {
            println!("{}", generate_bag_number());
        }
        Some(Commands::RegisterDonor {
            ref name,
            blood_type,
            last_donation,
            ref contact,
        }) => {
            let donor =
                service()?.register_donor(name, blood_type, last_donation, contact.clone())?;
            println!("Registered donor {} ({})", donor.id, donor.blood_type);
        }
        Some(Commands::Donors { blood_type }) => {
            let service = service()?;
            let donors = match blood_type {
                Some(blood_type) => service.donors().list_by_blood_type(blood_type),
                None => service.donors().list(),
            };
            if donors.is_empty() {
                println!("No donors found.");
            }
            for donor in donors {
                let status = if is_donor_eligible(donor.last_donation_date) {
                    "eligible"
                } else {
                    "deferred"
                };
                println!(
                    "ID: {}, Name: {}, Type: {}, {}",
                    donor.id, donor.name, donor.blood_type, status
                );
            }
        }
        Some(Commands::Donations { donor }) => {
            let service = service()?;
            let donations = match donor {
                Some(donor_id) => service.donations().list_for_donor(&donor_id),
                None => service.donations().list(),
            };
            if donations.is_empty() {
                println!("No donations found.");
            }
            for donation in donations {
                println!(
                    "{}  {}  {:<20} {} ml  {}",
                    donation.id,
                    donation.bag_number,
                    donation.component_type,
                    donation.volume_ml,
                    format_day(donation.donated_at)
                );
            }
        }
        Some(Commands::Donate {
            donor_id,
            component,
            volume_ml,
        }) => {
            let (donation, unit) = service()?.record_donation(&donor_id, component, volume_ml)?;
            println!("Recorded donation {}", donation.id);
            print_unit(&unit);
        }
        Some(Commands::AddUnit {
            blood_type,
            component,
            collection_date,
            volume_ml,
        }) => {
            let unit = service()?.add_unit(blood_type, component, collection_date, volume_ml)?;
            print_unit(&unit);
        }
        Some(Commands::Inventory {
            status,
            active,
            summary,
        }) => {
            let service = service()?;
            if summary {
                for level in service.stock_summary() {
                    println!(
                        "{:<3} {:<20} {} units, {} ml",
                        level.blood_type,
                        level.component_type,
                        level.units,
                        level.total_volume_ml
                    );
                }
            } else {
                let mut units = match status {
                    Some(status) => service.inventory().list_by_status(status),
                    None if active => service.inventory().list_active(),
                    None => service.inventory().list(),
                };
                if active {
                    units.retain(|u| u.status.is_active());
                }
                if units.is_empty() {
                    println!("No units found.");
                }
                units.iter().for_each(print_unit);
            }
        }
        Some(Commands::Request {
            ref patient_ref,
            recipient,
            component,
            units,
            priority,
            ref notes,
        }) => {
            let request = service()?.create_request(NewRequest {
                patient_ref: NonEmptyText::new(patient_ref)?,
                recipient_blood_type: recipient,
                component_type: component,
                units_requested: units,
                priority,
                notes: notes.clone(),
            })?;
            println!("Opened request {} ({})", request.id, request.priority);
        }
        Some(Commands::Requests { open }) => {
            let service = service()?;
            let requests = if open {
                service.requests().list_open()
            } else {
                service.requests().list()
            };
            if requests.is_empty() {
                println!("No requests found.");
            }
            requests.iter().for_each(print_request);
        }
        Some(Commands::Candidates { request_id }) => {
            let units = service()?.compatible_units(&request_id)?;
            if units.is_empty() {
                println!("No compatible units in stock.");
            }
            units.iter().for_each(print_unit);
        }
        Some(Commands::Reserve {
            request_id,
            ref bag_number,
        }) => {
            let unit = service()?.reserve_unit(&request_id, bag_number)?;
            print_unit(&unit);
        }
        Some(Commands::Issue {
            request_id,
            ref bag_number,
        }) => {
            let unit = service()?.issue_unit(&request_id, bag_number)?;
            print_unit(&unit);
        }
        Some(Commands::Cancel { request_id }) => {
            let request = service()?.cancel_request(&request_id)?;
            println!("Request {} is {}", request.id, request.status);
        }
        Some(Commands::Transfuse {
            request_id,
            ref bag_number,
            ref adverse_reaction,
        }) => {
            let transfusion =
                service()?.record_transfusion(&request_id, bag_number, adverse_reaction.clone())?;
            println!(
                "Recorded transfusion {} of {}",
                transfusion.id, transfusion.bag_number
            );
        }
        Some(Commands::Transfusions { request }) => {
            let service = service()?;
            let transfusions = match request {
                Some(request_id) => service.transfusions().list_for_request(&request_id),
                None => service.transfusions().list(),
            };
            if transfusions.is_empty() {
                println!("No transfusions found.");
            }
            for t in transfusions {
                let reaction = t.adverse_reaction.as_deref().unwrap_or("none");
                println!(
                    "{}  {}  {} -> {}  {}  reaction: {}",
                    t.id,
                    t.bag_number,
                    t.donor_blood_type,
                    t.recipient_blood_type,
                    format_day(t.transfused_at),
                    reaction
                );
            }
        }
        Some(Commands::DiscardExpired) => {
            let discarded = service()?.discard_expired()?;
            println!("Discarded {} expired unit(s)", discarded.len());
            discarded.iter().for_each(print_unit);
        }
        None => {
            println!("Use --help for available commands");
        }
    }

    Ok(())
}
