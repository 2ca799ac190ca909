/*!
 * Operator prompts
 * dialoguer renders on stderr, keeping stdout clean for the client config.
 * Without a terminal the answers are read line by line from stdin.
 */

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Result};
use console::Term;
use dialoguer::{Confirm, Input};

use wgpool_core::{NewPeer, PeerKey};

const GENERATE_PROMPT: &str = "Do you want to generate a new key pair for the client?";
const USERNAME_PROMPT: &str = "Enter the username";
const PUBLIC_KEY_PROMPT: &str = "Enter the public key";

pub fn ask_new_peer() -> Result<NewPeer> {
    if io::stdin().is_terminal() && Term::stderr().is_term() {
        ask_interactive()
    } else {
        read_answers(&mut io::stdin().lock(), &mut io::stderr())
    }
}

fn ask_interactive() -> Result<NewPeer> {
    let generate = Confirm::new()
        .with_prompt(GENERATE_PROMPT)
        .default(false)
        .interact()?;

    let username: String = Input::new()
        .with_prompt(USERNAME_PROMPT)
        .interact_text()?;

    let key = if generate {
        PeerKey::Generate
    } else {
        let public_key: String = Input::new()
            .with_prompt(PUBLIC_KEY_PROMPT)
            .interact_text()?;
        PeerKey::Supplied { public_key }
    };

    Ok(NewPeer { username, key })
}

/// Only `yes` or `y` (any case) count as yes.
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}

fn read_line(input: &mut impl BufRead, prompts: &mut impl Write, prompt: &str) -> Result<String> {
    write!(prompts, "{prompt}: ")?;
    prompts.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("unexpected end of input while waiting for: {prompt}");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Same questions as the interactive path, answered one per line.
fn read_answers(input: &mut impl BufRead, prompts: &mut impl Write) -> Result<NewPeer> {
    let generate = is_yes(&read_line(input, prompts, &format!("{GENERATE_PROMPT} (yes/no)"))?);
    let username = read_line(input, prompts, USERNAME_PROMPT)?;

    let key = if generate {
        PeerKey::Generate
    } else {
        let public_key = read_line(input, prompts, PUBLIC_KEY_PROMPT)?;
        PeerKey::Supplied { public_key }
    };

    Ok(NewPeer { username, key })
}
