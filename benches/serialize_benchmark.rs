// SPDX-License-Identifier: MIT
//! Benchmark for Shell Link serialization and two-pass offset resolution

use criterion::{criterion_group, criterion_main, Criterion};
use shell_link_builder::{
    build, ConsoleBlock, DriveType, EnvironmentVariableBlock, FileEntry, FileEntryKind, LinkInfo,
    LinkTargetIdList, LocalTarget, NetworkLink, ShellItem, ShellLink, VolumeId, VolumeLabel,
};
use std::hint::black_box;
use std::io::Write;
use tempfile::NamedTempFile;

fn create_link_info() -> LinkInfo {
    let volume = VolumeId::new(DriveType::Fixed, 0x307A_8A81, VolumeLabel::Unicode("System".into()))
        .unwrap();
    let network = NetworkLink::new("\\\\fileserver\\projects")
        .unwrap()
        .with_device_name("P:")
        .unwrap();
    let mut info = LinkInfo::new()
        .with_local(LocalTarget::new(volume, "C:\\Users\\bench\\Documents\\report.txt").unwrap())
        .with_network(network);
    info.set_common_path_suffix("reports\\report.txt").unwrap();
    info.unicode = true;
    info
}

fn create_link() -> ShellLink {
    let mut id_list = LinkTargetIdList::new();
    id_list.push(&ShellItem::my_computer()).unwrap();
    id_list.push(&ShellItem::volume("C:\\")).unwrap();
    for dir in ["Users", "bench", "Documents"] {
        id_list
            .push(&ShellItem::File(
                FileEntry::new(dir, FileEntryKind::Directory)
                    .unwrap()
                    .with_extension(),
            ))
            .unwrap();
    }
    id_list
        .push(&ShellItem::File(
            FileEntry::new("report.txt", FileEntryKind::File)
                .unwrap()
                .with_extension(),
        ))
        .unwrap();

    let mut link = ShellLink::new();
    link.set_id_list(id_list).unwrap();
    link.set_link_info(create_link_info()).unwrap();
    link.set_relative_path("..\\Documents\\report.txt").unwrap();
    link.set_working_dir("C:\\Users\\bench\\Documents").unwrap();
    link.set_icon_location("%SystemRoot%\\system32\\shell32.dll").unwrap();
    link.extra_data.push(
        EnvironmentVariableBlock::new("%USERPROFILE%\\Documents\\report.txt").unwrap(),
    );
    link.extra_data.push(ConsoleBlock::new());
    link
}

fn benchmark_build_link_info(c: &mut Criterion) {
    let info = create_link_info();

    c.bench_function("link_info_build", |b| {
        b.iter(|| {
            let _bytes = build(black_box(&info)).unwrap();
        })
    });
}

fn benchmark_serialize(c: &mut Criterion) {
    let link = create_link();

    c.bench_function("shell_link_serialize", |b| {
        b.iter(|| {
            let _bytes = black_box(&link).serialize().unwrap();
        })
    });
}

fn benchmark_write_file(c: &mut Criterion) {
    let link = create_link();

    c.bench_function("shell_link_write_file", |b| {
        b.iter(|| {
            let mut file = NamedTempFile::new().unwrap();
            link.write_to(&mut file).unwrap();
            file.flush().unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_build_link_info,
    benchmark_serialize,
    benchmark_write_file
);
criterion_main!(benches);
