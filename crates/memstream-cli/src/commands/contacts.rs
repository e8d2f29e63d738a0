use clap::{Args, Subcommand};
use memstream_core::{Clock, Contact, ContactBook, Relationship};

use crate::common::{clock, open_store, CliResult};

#[derive(Args)]
pub struct ContactArgs {
    /// Contact name
    name: String,
    /// friend, family, partner or other
    #[arg(long, default_value = "friend")]
    relationship: Relationship,
    /// Explicit contact id (defaults to an existing contact with the same name)
    #[arg(long)]
    id: Option<String>,
}

#[derive(Subcommand)]
pub enum ContactsAction {
    /// Tag a contact on a photo
    Tag {
        /// Photo id
        photo_id: String,
        #[command(flatten)]
        contact: ContactArgs,
    },
    /// Record a chat with a contact (makes them the current chat)
    Chat {
        #[command(flatten)]
        contact: ContactArgs,
    },
    /// Show tags, recent chats and the current chat
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn resolve(book: &ContactBook, args: ContactArgs) -> Contact {
    if let Some(id) = args.id {
        return Contact::new(id, args.name, args.relationship);
    }
    match book
        .known_contacts()
        .find(|c| c.name.eq_ignore_ascii_case(&args.name))
    {
        Some(existing) => Contact {
            relationship: args.relationship,
            ..existing.clone()
        },
        None => Contact::generated(args.name, args.relationship),
    }
}

pub fn run(action: ContactsAction) -> CliResult {
    let store = open_store()?;
    let mut book = ContactBook::load(store.as_ref());

    match action {
        ContactsAction::Tag { photo_id, contact } => {
            let contact = resolve(&book, contact);
            println!("tagged {} on {photo_id}", contact.name);
            book.tag_photo(&photo_id, contact);
            book.save(store.as_ref())?;
        }
        ContactsAction::Chat { contact } => {
            let contact = resolve(&book, contact);
            println!("chatting with {}", contact.name);
            book.record_chat(contact, clock().now());
            book.save(store.as_ref())?;
        }
        ContactsAction::List { json } => {
            if json {
                let value = serde_json::json!({
                    "photo_contacts": book.photo_contacts(),
                    "chat_activities": book.chat_activities(),
                    "current_chat": book.current_chat(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            println!("tags:");
            for pc in book.photo_contacts() {
                println!("  {:<16} {} ({:?})", pc.photo_id, pc.contact.name, pc.contact.relationship);
            }
            println!("recent chats:");
            for ca in book.chat_activities() {
                println!("  {:<16} {}", ca.contact.name, ca.last_chat_at.to_rfc3339());
            }
            match book.current_chat() {
                Some(c) => println!("current chat: {}", c.name),
                None => println!("current chat: none"),
            }
        }
    }
    Ok(())
}
