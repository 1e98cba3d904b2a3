// SPDX-License-Identifier: MIT
use std::io::Read;

use shell_link_builder::{
    ConsoleBlock, DriveType, EnvironmentVariableBlock, FileEntry, FileEntryKind, LinkInfo,
    LinkTargetIdList, LocalTarget, NetworkLink, SerializeError, ShellItem, ShellLink, StringKind,
    VolumeId, VolumeLabel, HEADER_SIZE,
};
use tempfile::NamedTempFile;

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(bytes[at..at + 2].try_into().unwrap())
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

/// Link to `C:\test\a.txt`
fn sample_link() -> ShellLink {
    let mut id_list = LinkTargetIdList::new();
    id_list.push(&ShellItem::my_computer()).unwrap();
    id_list.push(&ShellItem::volume("C:\\")).unwrap();
    id_list
        .push(&ShellItem::File(
            FileEntry::new("test", FileEntryKind::Directory).unwrap(),
        ))
        .unwrap();
    id_list
        .push(&ShellItem::File(
            FileEntry::new("a.txt", FileEntryKind::File).unwrap(),
        ))
        .unwrap();

    let volume = VolumeId::new(DriveType::Fixed, 0x307A_8A81, VolumeLabel::default()).unwrap();
    let info = LinkInfo::new().with_local(LocalTarget::new(volume, "C:\\test\\a.txt").unwrap());

    let mut link = ShellLink::new();
    link.set_id_list(id_list).unwrap();
    link.set_link_info(info).unwrap();
    link.set_relative_path("\\a.txt").unwrap();
    link.set_working_dir("C:\\test").unwrap();
    link.set("EnableTargetMetadata", 1).unwrap();
    link
}

#[test]
fn test_sample_link_layout() {
    let link = sample_link();
    let bytes = link.serialize().unwrap();

    // Header
    assert_eq!(u32_at(&bytes, 0), 0x4C);
    assert_eq!(
        &bytes[4..20],
        &hex::decode("0114020000000000c000000000000046").unwrap()[..]
    );
    assert_eq!(u32_at(&bytes, 20), 0x0008_009B);

    // Item identifier list
    let id_list_size = u16_at(&bytes, HEADER_SIZE) as usize;
    let id_list_end = HEADER_SIZE + 2 + id_list_size;
    assert_eq!(id_list_size, link.id_list().unwrap().list().encoded_len());
    assert_eq!(&bytes[id_list_end - 2..id_list_end], &[0, 0]);
    // First record: My Computer root
    assert_eq!(u16_at(&bytes, HEADER_SIZE + 2), 20);
    assert_eq!(bytes[HEADER_SIZE + 4], 0x1F);
    assert_eq!(bytes[HEADER_SIZE + 5], 0x50);

    // Location info
    let info = &bytes[id_list_end..];
    let info_size = u32_at(info, 0) as usize;
    assert_eq!(info_size, 0x3C);
    assert_eq!(u32_at(info, 4), 0x1C);
    assert_eq!(u32_at(info, 8), 1);
    assert_eq!(u32_at(info, 12), 0x1C);
    assert_eq!(u32_at(info, 16), 0x2D);
    assert_eq!(u32_at(info, 20), 0);
    assert_eq!(u32_at(info, 24), 0x3B);
    assert_eq!(u32_at(info, 0x1C + 8), 0x307A_8A81);
    assert_eq!(&info[0x2D..0x3B], b"C:\\test\\a.txt\0");
    assert_eq!(info[0x3B], 0);

    // Strings
    let strings = &info[info_size..];
    assert_eq!(u16_at(strings, 0), 7);
    assert_eq!(&strings[2..4], &[b'\\', 0]);
    let working_dir = &strings[16..];
    assert_eq!(u16_at(working_dir, 0), 8);
    assert_eq!(&working_dir[2..6], &[b'C', 0, b':', 0]);

    // Terminal block only
    assert_eq!(working_dir.len(), 18 + 4);
    assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);
}

#[test]
fn test_raw_flags_and_strings() {
    let mut link = ShellLink::new();
    link.set("HasName", 1).unwrap();
    link.set("HasWorkingDir", 1).unwrap();
    link.strings_mut().set(StringKind::Name, "x\0").unwrap();
    link.strings_mut().set(StringKind::WorkingDir, "y\0").unwrap();

    let bytes = link.serialize().unwrap();
    assert_eq!(u32_at(&bytes, 20), 0b1_0100);
    assert_eq!(
        &bytes[HEADER_SIZE..],
        &[2, 0, b'x', 0, 0, 0, 2, 0, b'y', 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn test_inconsistent_flags() {
    let mut link = sample_link();
    link.take_link_info();

    match link.serialize() {
        Err(SerializeError::InconsistentFlags { flag, .. }) => assert_eq!(flag, "HasLinkInfo"),
        other => panic!("Expected InconsistentFlags, got {:?}", other),
    }

    link.set("HasLinkInfo", 0).unwrap();
    assert!(link.serialize().is_ok());
}

#[test]
fn test_network_link_info() {
    let network = NetworkLink::new("\\\\server\\share")
        .unwrap()
        .with_device_name("Z:")
        .unwrap();
    let mut info = LinkInfo::new().with_network(network);
    info.set_common_path_suffix("docs\\a.txt").unwrap();

    let mut link = ShellLink::new();
    link.set_link_info(info).unwrap();
    let bytes = link.serialize().unwrap();
    let info = &bytes[HEADER_SIZE..];

    assert_eq!(u32_at(info, 8), 2);
    assert_eq!(u32_at(info, 12), 0);
    assert_eq!(u32_at(info, 16), 0);

    let network_at = u32_at(info, 20) as usize;
    let suffix_at = u32_at(info, 24) as usize;
    assert_eq!(network_at, 0x1C);

    let network = &info[network_at..];
    let net_name = u32_at(network, 8) as usize;
    let device = u32_at(network, 12) as usize;
    assert_eq!(&network[net_name..net_name + 15], b"\\\\server\\share\0");
    assert_eq!(&network[device..device + 3], b"Z:\0");
    assert_eq!(&info[suffix_at..suffix_at + 11], b"docs\\a.txt\0");
}

#[test]
fn test_unicode_link_info_offsets() {
    let volume = VolumeId::new(DriveType::Fixed, 1, VolumeLabel::default()).unwrap();
    let mut info = LinkInfo::new().with_local(LocalTarget::new(volume, "C:\\x").unwrap());
    info.unicode = true;

    let mut link = ShellLink::new();
    link.set_link_info(info).unwrap();
    let bytes = link.serialize().unwrap();
    let info = &bytes[HEADER_SIZE..];

    assert_eq!(u32_at(info, 4), 0x24);
    let path = u32_at(info, 28) as usize;
    let suffix = u32_at(info, 32) as usize;
    assert_eq!(&info[path..path + 10], &[b'C', 0, b':', 0, b'\\', 0, b'x', 0, 0, 0]);
    assert_eq!(&info[suffix..suffix + 2], &[0, 0]);
    assert_eq!(suffix + 2, u32_at(info, 0) as usize);
}

#[test]
fn test_extra_data_blocks() {
    let mut link = ShellLink::new();
    link.extra_data
        .push(EnvironmentVariableBlock::new("%windir%\\notepad.exe").unwrap());
    link.extra_data.push(ConsoleBlock::new());

    let bytes = link.serialize().unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE + 0x314 + 0xCC + 4);
    assert_eq!(u32_at(&bytes, HEADER_SIZE + 4), 0xA000_0001);
    assert_eq!(u32_at(&bytes, HEADER_SIZE + 0x314 + 4), 0xA000_0002);
}

#[test]
fn test_write_to_file() {
    let link = sample_link();
    let mut file = NamedTempFile::new().unwrap();
    link.write_to(&mut file).unwrap();

    let mut written = Vec::new();
    file.reopen().unwrap().read_to_end(&mut written).unwrap();
    assert_eq!(written, link.serialize().unwrap());
}

#[test]
fn test_serialize_from_threads() {
    let link = std::sync::Arc::new(sample_link());
    let expected = link.serialize().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let link = std::sync::Arc::clone(&link);
            std::thread::spawn(move || link.serialize().unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
