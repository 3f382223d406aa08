//! Builds small but complete dataset files in memory, in both schema
//! versions, for the integration tests.
//!
//! The fixture describes two components (a hardware platform and a
//! browser), two properties (`IsMobile`, `BrowserName`), four values, four
//! profiles, two signatures and a four-node trie, and serialises them with
//! the exact section layouts the crate reads.
#![allow(dead_code)]

use std::sync::Arc;

use uadex::version::DatasetVersion;

pub const PROFILES_PER_SIGNATURE: i32 = 2;
pub const NODES_PER_SIGNATURE: i32 = 2;

/// A serialised dataset plus the keys the tests address records by.
pub struct Fixture {
    pub bytes: Arc<[u8]>,
    pub version: DatasetVersion,
    /// Byte offsets of the four profiles within the profiles section.
    pub profile_offsets: Vec<i32>,
    /// Byte offsets of the four nodes within the nodes section.
    pub node_offsets: Vec<i32>,
    /// Published profile ids, in profile order.
    pub profile_ids: Vec<i32>,
    /// String offset of the dataset name, for direct string loads.
    pub name_offset: i32,
}

struct StringSection {
    buf: Vec<u8>,
    count: u32,
}

impl StringSection {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            count: 0,
        }
    }

    fn add(&mut self, value: &str) -> i32 {
        let offset = self.buf.len() as i32;
        push_i16(&mut self.buf, value.len() as i16);
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        self.count += 1;
        offset
    }
}

struct NodeDef {
    position: i16,
    next_position: i16,
    parent: Option<usize>,
    character_string: i32,
    children: Vec<usize>,
    ranked: Vec<i32>,
}

pub fn build(version: DatasetVersion) -> Fixture {
    let v32 = version >= DatasetVersion::V32;

    let mut strings = StringSection::new();
    let empty = strings.add("");
    let copyright = strings.add("Copyright Example Data");
    let name = strings.add("Lite");
    let format = strings.add(if v32 { "PatternV32" } else { "PatternV31" });
    let hardware_component = strings.add("HardwarePlatform");
    let browser_component = strings.add("BrowserUA");
    let is_mobile = strings.add("IsMobile");
    let browser_name = strings.add("BrowserName");
    let category_device = strings.add("Device");
    let category_browser = strings.add("Browser");
    let value_true = strings.add("True");
    let value_false = strings.add("False");
    let value_safari = strings.add("Safari");
    let value_chrome = strings.add("Chrome");
    let map_name = strings.add("Default");
    let chars_iphone = strings.add("iPhone");
    let chars_windows = strings.add("Windows");
    let user_agent_header = strings.add("User-Agent");

    // Profiles: (component index, profile id, value indexes, signature
    // indexes). Byte offsets accumulate as the records are written.
    let profile_defs: [(u8, i32, Vec<i32>, Vec<i32>); 4] = [
        (0, 101, vec![0], vec![0]),
        (0, 102, vec![1], vec![1]),
        (1, 201, vec![2], vec![0]),
        (1, 202, vec![3], vec![1]),
    ];
    let mut profiles_body = Vec::new();
    let mut profile_offsets = Vec::new();
    let mut profile_ids = Vec::new();
    for (component, id, values, signatures) in &profile_defs {
        profile_offsets.push(profiles_body.len() as i32);
        profile_ids.push(*id);
        profiles_body.push(*component);
        push_i32(&mut profiles_body, *id);
        push_i32(&mut profiles_body, values.len() as i32);
        push_i32(&mut profiles_body, signatures.len() as i32);
        for value in values {
            push_i32(&mut profiles_body, *value);
        }
        for signature in signatures {
            push_i32(&mut profiles_body, *signature);
        }
    }

    // A four-node trie: one root per component, the first root carrying the
    // two character-matching children the signatures refer to.
    let node_defs = [
        NodeDef {
            position: -1,
            next_position: -1,
            parent: None,
            character_string: -1,
            children: vec![1, 2],
            ranked: Vec::new(),
        },
        NodeDef {
            position: 0,
            next_position: 6,
            parent: Some(0),
            character_string: chars_iphone,
            children: Vec::new(),
            ranked: vec![0],
        },
        NodeDef {
            position: 0,
            next_position: 7,
            parent: Some(0),
            character_string: chars_windows,
            children: Vec::new(),
            ranked: vec![1],
        },
        NodeDef {
            position: -1,
            next_position: -1,
            parent: None,
            character_string: -1,
            children: Vec::new(),
            ranked: Vec::new(),
        },
    ];

    let node_length = |def: &NodeDef| -> usize {
        let body = 5 * def.children.len();
        if v32 {
            16 + 2 + body + if def.ranked.is_empty() { 0 } else { 4 }
        } else {
            16 + 4 + body + 4 * def.ranked.len()
        }
    };

    let mut node_offsets = Vec::new();
    let mut offset = 0usize;
    for def in &node_defs {
        node_offsets.push(offset as i32);
        offset += node_length(def);
    }

    let mut nodes_body = Vec::new();
    let mut ranked_seen = 0i32;
    let mut node_ranked_indexes = Vec::new();
    for def in &node_defs {
        push_i16(&mut nodes_body, def.position);
        push_i16(&mut nodes_body, def.next_position);
        push_i32(
            &mut nodes_body,
            def.parent.map_or(-1, |parent| node_offsets[parent]),
        );
        push_i32(&mut nodes_body, def.character_string);
        push_i16(&mut nodes_body, def.children.len() as i16);
        push_i16(&mut nodes_body, 0); // numeric children
        if v32 {
            push_u16(&mut nodes_body, def.ranked.len() as u16);
        } else {
            push_i32(&mut nodes_body, def.ranked.len() as i32);
        }
        for child in &def.children {
            nodes_body.push(0); // is_string: a node reference
            push_i32(&mut nodes_body, node_offsets[*child]);
        }
        if v32 {
            if !def.ranked.is_empty() {
                push_i32(&mut nodes_body, ranked_seen);
            }
            ranked_seen += def.ranked.len() as i32;
            node_ranked_indexes.extend_from_slice(&def.ranked);
        } else {
            for index in &def.ranked {
                push_i32(&mut nodes_body, *index);
            }
        }
    }

    // Values: (property index, name).
    let value_defs = [
        (0i16, value_true),
        (0, value_false),
        (1, value_safari),
        (1, value_chrome),
    ];
    let mut values_body = Vec::new();
    for (property, name_offset) in &value_defs {
        push_i16(&mut values_body, *property);
        push_i32(&mut values_body, *name_offset);
        push_i32(&mut values_body, empty);
        push_i32(&mut values_body, empty);
    }

    // Signatures: one mobile (iPhone/Safari), one desktop (Windows/Chrome).
    let signature_defs = [
        (
            [profile_offsets[0], profile_offsets[2]],
            0i32,
            node_offsets[1],
        ),
        (
            [profile_offsets[1], profile_offsets[3]],
            1,
            node_offsets[2],
        ),
    ];
    let mut signatures_body = Vec::new();
    let mut signature_node_offsets = Vec::new();
    for (index, (profiles, rank, node_offset)) in signature_defs.iter().enumerate() {
        for profile in profiles {
            push_i32(&mut signatures_body, *profile);
        }
        push_i32(&mut signatures_body, *rank);
        if v32 {
            push_i32(&mut signatures_body, index as i32);
            signatures_body.push(1); // node count
            signature_node_offsets.push(*node_offset);
        } else {
            push_i32(&mut signatures_body, *node_offset);
            push_i32(&mut signatures_body, -1); // unused node slot
        }
    }

    let mut components_body = Vec::new();
    let component_defs = [
        (1i32, hardware_component, profile_offsets[0]),
        (2, browser_component, profile_offsets[2]),
    ];
    for (id, name_offset, default_profile) in &component_defs {
        push_i32(&mut components_body, *id);
        push_i32(&mut components_body, *name_offset);
        push_i32(&mut components_body, *default_profile);
        if v32 {
            push_u16(&mut components_body, 1);
            push_i32(&mut components_body, user_agent_header);
        }
    }

    let mut maps_body = Vec::new();
    push_i32(&mut maps_body, map_name);

    // Properties: (component, type, default value, name, category, first
    // and last value indexes).
    let property_defs = [
        (0u8, 3u8, 1i32, is_mobile, category_device, 0i32, 1i32),
        (1, 0, 2, browser_name, category_browser, 2, 3),
    ];
    let mut properties_body = Vec::new();
    for (index, (component, value_type, default, name_offset, category, first, last)) in
        property_defs.iter().enumerate()
    {
        properties_body.push(*component);
        properties_body.push(index as u8); // display order
        properties_body.push(1); // mandatory
        properties_body.push(0); // list
        properties_body.push(1); // show values
        properties_body.push(0); // obsolete
        properties_body.push(1); // show
        properties_body.push(*value_type);
        push_i32(&mut properties_body, *default);
        push_i32(&mut properties_body, *name_offset);
        push_i32(&mut properties_body, empty);
        push_i32(&mut properties_body, *category);
        push_i32(&mut properties_body, empty);
        push_i32(&mut properties_body, *first);
        push_i32(&mut properties_body, *last);
        push_i32(&mut properties_body, 1); // map count
        push_i32(&mut properties_body, 0); // first map index
    }

    let ranked_signature_indexes = [0i32, 1];

    let mut root_nodes_body = Vec::new();
    push_i32(&mut root_nodes_body, node_offsets[0]);
    push_i32(&mut root_nodes_body, node_offsets[3]);

    let mut profile_offsets_body = Vec::new();
    for (id, offset) in profile_ids.iter().zip(&profile_offsets) {
        push_i32(&mut profile_offsets_body, *id);
        push_i32(&mut profile_offsets_body, *offset);
    }

    // Assemble the file: common header, then the sections in their
    // mandated order.
    let mut out = Vec::new();
    push_i32(&mut out, 3);
    push_i32(&mut out, if v32 { 2 } else { 1 });
    out.extend_from_slice(&[0xAB; 16]); // tag
    if v32 {
        out.extend_from_slice(&[0xCD; 16]); // export tag
    }
    push_i32(&mut out, copyright);
    push_i16(&mut out, 6); // age in months
    push_i32(&mut out, 10); // minimum User-Agent count
    push_i32(&mut out, name);
    push_i32(&mut out, format);
    push_date(&mut out, 2024, 1, 15); // published
    push_date(&mut out, 2024, 4, 15); // next update
    push_i32(&mut out, 4); // device combinations
    push_i16(&mut out, 255); // maximum User-Agent length
    push_i16(&mut out, 8); // minimum User-Agent length
    out.push(b' '); // lowest character
    out.push(b'~'); // highest character
    push_i32(&mut out, 2); // maximum signatures
    push_i32(&mut out, PROFILES_PER_SIGNATURE);
    push_i32(&mut out, NODES_PER_SIGNATURE);
    push_i16(&mut out, 4); // maximum values
    push_i32(&mut out, 512); // csv buffer length
    push_i32(&mut out, 1024); // json buffer length
    push_i32(&mut out, 2048); // xml buffer length
    push_i32(&mut out, 2); // maximum signatures for closest match
    if v32 {
        push_i32(&mut out, 2); // maximum rank
    }

    section(&mut out, strings.count, &strings.buf);
    section(&mut out, component_defs.len() as u32, &components_body);
    section(&mut out, 1, &maps_body);
    section(&mut out, property_defs.len() as u32, &properties_body);
    section(&mut out, value_defs.len() as u32, &values_body);
    section(&mut out, profile_defs.len() as u32, &profiles_body);
    section(&mut out, signature_defs.len() as u32, &signatures_body);
    if v32 {
        section(
            &mut out,
            signature_node_offsets.len() as u32,
            &ints(&signature_node_offsets),
        );
        section(
            &mut out,
            node_ranked_indexes.len() as u32,
            &ints(&node_ranked_indexes),
        );
    }
    section(
        &mut out,
        ranked_signature_indexes.len() as u32,
        &ints(&ranked_signature_indexes),
    );
    section(&mut out, node_defs.len() as u32, &nodes_body);
    section(&mut out, 2, &root_nodes_body);
    section(&mut out, profile_ids.len() as u32, &profile_offsets_body);

    Fixture {
        bytes: Arc::from(out),
        version,
        profile_offsets,
        node_offsets,
        profile_ids,
        name_offset: name,
    }
}

fn section(out: &mut Vec<u8>, count: u32, body: &[u8]) {
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 8]); // reserved
    out.extend_from_slice(body);
}

fn ints(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn push_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_date(out: &mut Vec<u8>, year: i16, month: u8, day: u8) {
    push_i16(out, year);
    out.push(month);
    out.push(day);
}
