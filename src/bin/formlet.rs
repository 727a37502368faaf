//! Command-line interface for formlet
//!
//! This binary validates JSON value documents against built-in demo forms
//! and previews mask formatting.
//!
//! Usage:
//!   formlet check `<values.json>` [--form `<name>`]   - Hydrate a demo form and validate it
//!   formlet mask `<pattern>` `<input>` [--cursor <n>] - Apply a mask pattern to raw input

use clap::{Arg, Command};
use serde::Serialize;

use formlet::form::attributes::{hint, identifier, label, name, options, placeholder, required};
use formlet::form::parser::{field, formatted_string, map2, map3, string};
use formlet::form::parser::{choice, email, Parser};
use formlet::form::protocol::parse_validate;
use formlet::form::tree::{self, hydrate, Field};
use formlet::form::value::Value;
use formlet::form::mask::{reformat_with_caret, MaskPattern};

fn main() {
    let matches = Command::new("formlet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for validating form values and previewing mask formatting")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Validate a JSON values document against a built-in demo form")
                .arg(
                    Arg::new("path")
                        .help("Path to the JSON values file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("form")
                        .long("form")
                        .short('f')
                        .help("Demo form to validate against ('checkout' or 'card')")
                        .default_value("checkout"),
                ),
        )
        .subcommand(
            Command::new("mask")
                .about("Apply a mask pattern to raw input and report the caret")
                .arg(
                    Arg::new("pattern")
                        .help("Mask pattern spec, e.g. '{d}{d}/{d}{d}'")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Raw input text")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("cursor")
                        .long("cursor")
                        .short('c')
                        .help("Caret offset in the raw input (defaults to the end)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("check", check_matches)) => {
            let path = check_matches.get_one::<String>("path").unwrap();
            let form = check_matches.get_one::<String>("form").unwrap();
            handle_check_command(path, form);
        }
        Some(("mask", mask_matches)) => {
            let pattern = mask_matches.get_one::<String>("pattern").unwrap();
            let input = mask_matches.get_one::<String>("input").unwrap();
            let cursor = mask_matches.get_one::<usize>("cursor").copied();
            handle_mask_command(pattern, input, cursor);
        }
        _ => unreachable!(),
    }
}

/// Handle the check command
fn handle_check_command(path: &str, form: &str) {
    let json = match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: {} is not valid JSON: {}", path, e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let outcome = match form {
        "checkout" => check_form(&json, checkout_form(), checkout_parser()),
        "card" => check_form(&json, card_form(), card_parser(|id| id)),
        other => {
            eprintln!("Error: unknown form '{}', try 'checkout' or 'card'", other);
            std::process::exit(1);
        }
    };
    std::process::exit(outcome);
}

/// Hydrate, validate, and report. Returns the process exit code.
fn check_form<Id, A>(json: &serde_json::Value, form: Field<Id>, parser: Parser<Id, A>) -> i32
where
    Id: Clone + PartialEq + std::fmt::Debug + 'static,
    A: Serialize + 'static,
{
    let tree = match hydrate::update_values_from_json(json, form) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let (_tree, result) = parse_validate(&parser, &tree);
    match result {
        Ok(parsed) => {
            match serde_json::to_string_pretty(&parsed) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return 1;
                }
            }
            0
        }
        Err(errors) => {
            for error in &errors {
                eprintln!("invalid: {}", error);
            }
            1
        }
    }
}

/// Handle the mask command
fn handle_mask_command(pattern: &str, input: &str, cursor: Option<usize>) {
    let mask = match MaskPattern::compile(pattern) {
        Ok(mask) => mask,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let cursor = cursor.unwrap_or_else(|| input.chars().count());
    let (formatted, caret) = reformat_with_caret(&mask, input, cursor);
    println!("{}", formatted);
    println!("caret: {}", caret);
}

// ============================================================================
// Demo forms: a card sub-form, an address sub-form and a recipient
// sub-form, composed into a checkout form under a sum-type identifier.
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardId {
    Number,
    Expiry,
    Holder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressId {
    Street,
    City,
    Country,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecipientId {
    Name,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckoutId {
    Card(CardId),
    Address(AddressId),
    Recipient(RecipientId),
}

#[derive(Debug, Serialize)]
struct Card {
    number: String,
    expiry: String,
    holder: String,
}

#[derive(Debug, Serialize)]
struct Address {
    street: String,
    city: String,
    country: String,
}

#[derive(Debug, Serialize)]
struct Recipient {
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct Checkout {
    card: Card,
    address: Address,
    recipient: Recipient,
}

fn card_mask() -> MaskPattern {
    MaskPattern::compile("{d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d} {d}{d}{d}{d}")
        .expect("card pattern compiles")
}

fn expiry_mask() -> MaskPattern {
    MaskPattern::compile("{d}{d}/{d}{d}").expect("expiry pattern compiles")
}

fn card_form() -> Field<CardId> {
    tree::group(
        vec![name("card")],
        vec![
            tree::text(vec![
                label("Card number"),
                name("number"),
                placeholder("4111 1111 1111 1111"),
                required(),
                identifier(CardId::Number),
            ]),
            tree::text(vec![
                label("Expiration"),
                name("expiry"),
                placeholder("MM/YY"),
                hint("As printed on the card"),
                required(),
                identifier(CardId::Expiry),
            ]),
            tree::text(vec![
                label("Cardholder name"),
                name("holder"),
                required(),
                identifier(CardId::Holder),
            ]),
        ],
    )
}

fn address_form() -> Field<AddressId> {
    tree::group(
        vec![name("address")],
        vec![
            tree::text(vec![
                label("Street"),
                name("street"),
                required(),
                identifier(AddressId::Street),
            ]),
            tree::text(vec![
                label("City"),
                name("city"),
                required(),
                identifier(AddressId::City),
            ]),
            tree::select(vec![
                label("Country"),
                name("country"),
                required(),
                options(vec![
                    ("United States".to_string(), Value::Str("US".to_string())),
                    ("Canada".to_string(), Value::Str("CA".to_string())),
                    ("United Kingdom".to_string(), Value::Str("GB".to_string())),
                ]),
                identifier(AddressId::Country),
            ]),
        ],
    )
}

fn recipient_form() -> Field<RecipientId> {
    tree::group(
        vec![name("recipient")],
        vec![
            tree::text(vec![
                label("Full name"),
                name("name"),
                required(),
                identifier(RecipientId::Name),
            ]),
            tree::email(vec![
                label("Email"),
                name("email"),
                required(),
                identifier(RecipientId::Email),
            ]),
        ],
    )
}

fn checkout_form() -> Field<CheckoutId> {
    tree::group(
        vec![name("checkout")],
        vec![
            card_form().map(&CheckoutId::Card),
            address_form().map(&CheckoutId::Address),
            recipient_form().map(&CheckoutId::Recipient),
        ],
    )
}

/// Card parser, parameterized over the identifier injection so the same
/// parser serves the standalone card form and the composed checkout.
fn card_parser<Id, W>(wrap: W) -> Parser<Id, Card>
where
    Id: Clone + PartialEq + 'static,
    W: Fn(CardId) -> Id + 'static,
{
    map3(
        |number, expiry, holder| Card {
            number,
            expiry,
            holder,
        },
        field(wrap(CardId::Number), formatted_string(card_mask())),
        field(wrap(CardId::Expiry), formatted_string(expiry_mask())),
        field(wrap(CardId::Holder), string()),
    )
}

fn address_parser<Id, W>(wrap: W) -> Parser<Id, Address>
where
    Id: Clone + PartialEq + 'static,
    W: Fn(AddressId) -> Id + 'static,
{
    map3(
        |street, city, country: Value| Address {
            street,
            city,
            country: country.raw_text(),
        },
        field(wrap(AddressId::Street), string()),
        field(wrap(AddressId::City), string()),
        field(wrap(AddressId::Country), choice()),
    )
}

fn recipient_parser<Id, W>(wrap: W) -> Parser<Id, Recipient>
where
    Id: Clone + PartialEq + 'static,
    W: Fn(RecipientId) -> Id + 'static,
{
    map2(
        |name, email| Recipient { name, email },
        field(wrap(RecipientId::Name), string()),
        field(wrap(RecipientId::Email), email()),
    )
}

fn checkout_parser() -> Parser<CheckoutId, Checkout> {
    map3(
        |card, address, recipient| Checkout {
            card,
            address,
            recipient,
        },
        card_parser(CheckoutId::Card),
        address_parser(CheckoutId::Address),
        recipient_parser(CheckoutId::Recipient),
    )
}
