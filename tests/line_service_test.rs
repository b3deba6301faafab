//! Service-level tests for lines and their sections

use std::sync::Arc;
use std::thread;

use rstest::{fixture, rstest};

use subway::application::dto::{LineCreateRequest, LineUpdateRequest, SectionCreateRequest};
use subway::application::{ApplicationError, Status};
use subway::config::Settings;
use subway::domain::{DomainError, LineId, StationId};
use subway::infrastructure::di::ServiceContainer;
use subway::util::testing;

struct Fixture {
    container: ServiceContainer,
    jamsil: StationId,
    yongsan: StationId,
    kondae: StationId,
    seongsu: StationId,
    line: LineId,
}

impl Fixture {
    fn add(&self, up: StationId, down: StationId, distance: i64) -> Result<Status, ApplicationError> {
        self.container
            .lines
            .add_section(self.line, &SectionCreateRequest::new(up, down, distance))
            .map(|r| r.status)
    }

    fn remove(&self, station: StationId) -> Result<Status, ApplicationError> {
        self.container
            .lines
            .remove_section(self.line, station)
            .map(|r| r.status)
    }

    fn station_ids(&self) -> Vec<StationId> {
        self.container
            .lines
            .find_line(self.line)
            .unwrap()
            .body
            .station_ids()
    }
}

fn create_station(container: &ServiceContainer, name: &str) -> StationId {
    let response = container.stations.create_station(name).unwrap();
    assert_eq!(response.status, Status::Created);
    response.body.id
}

/// Four stations and line 2호선 running 잠실역 -10-> 용산역.
#[fixture]
fn line_2() -> Fixture {
    testing::init_test_setup();
    let container = ServiceContainer::in_memory(Settings::default());
    let jamsil = create_station(&container, "잠실역");
    let yongsan = create_station(&container, "용산역");
    let kondae = create_station(&container, "건대입구역");
    let seongsu = create_station(&container, "성수역");

    let response = container
        .lines
        .create_line(&LineCreateRequest {
            name: "2호선".into(),
            color: "green".into(),
            up_station_id: jamsil,
            down_station_id: yongsan,
            distance: 10,
        })
        .unwrap();
    assert_eq!(response.status, Status::Created);

    Fixture {
        line: response.body.id,
        container,
        jamsil,
        yongsan,
        kondae,
        seongsu,
    }
}

// ============================================================
// Section registration
// ============================================================

#[rstest]
fn given_line_when_adding_section_at_down_end_then_created_and_listed(line_2: Fixture) {
    let status = line_2.add(line_2.yongsan, line_2.kondae, 5).unwrap();

    assert_eq!(status, Status::Created);
    assert_eq!(
        line_2.station_ids(),
        vec![line_2.jamsil, line_2.yongsan, line_2.kondae]
    );
}

#[rstest]
fn given_line_when_adding_middle_section_then_station_is_inserted(line_2: Fixture) {
    let status = line_2.add(line_2.jamsil, line_2.kondae, 4).unwrap();

    assert_eq!(status, Status::Created);
    assert_eq!(
        line_2.station_ids(),
        vec![line_2.jamsil, line_2.kondae, line_2.yongsan]
    );
    let line = line_2.container.lines.find_line(line_2.line).unwrap().body;
    let distances: Vec<u64> = line.sections.iter().map(|s| s.distance).collect();
    assert_eq!(distances, vec![4, 6]);
}

#[rstest]
fn given_line_when_adding_section_at_up_end_then_station_becomes_first(line_2: Fixture) {
    let status = line_2.add(line_2.seongsu, line_2.jamsil, 4).unwrap();

    assert_eq!(status, Status::Created);
    assert_eq!(
        line_2.station_ids(),
        vec![line_2.seongsu, line_2.jamsil, line_2.yongsan]
    );
}

#[rstest]
fn given_line_when_adding_section_before_down_station_then_split_from_down_side(
    line_2: Fixture,
) {
    line_2.add(line_2.kondae, line_2.yongsan, 3).unwrap();

    assert_eq!(
        line_2.station_ids(),
        vec![line_2.jamsil, line_2.kondae, line_2.yongsan]
    );
}

#[rstest]
fn given_both_stations_registered_when_adding_then_bad_request_with_message(line_2: Fixture) {
    let err = line_2.add(line_2.jamsil, line_2.yongsan, 5).unwrap_err();

    assert_eq!(err.status(), Status::BadRequest);
    assert_eq!(
        err.to_string(),
        "이미 노선에 등록되어있는 역은 새로운 구간의 하행역이 될 수 없습니다."
    );
}

#[rstest]
fn given_longer_split_when_adding_then_bad_request_with_message(line_2: Fixture) {
    let err = line_2.add(line_2.jamsil, line_2.kondae, 50).unwrap_err();

    assert_eq!(err.status(), Status::BadRequest);
    assert_eq!(err.to_string(), "기존구간의 거리보다 더 길수 없습니다.");
}

#[rstest]
fn given_unconnected_section_when_adding_then_bad_request(line_2: Fixture) {
    let err = line_2.add(line_2.kondae, line_2.seongsu, 5).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::DisconnectedSection)
    ));
    assert_eq!(err.status(), Status::BadRequest);
}

#[rstest]
fn given_unknown_station_when_adding_then_not_found(line_2: Fixture) {
    let err = line_2.add(line_2.yongsan, StationId(999), 5).unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownStation(StationId(999))));
    assert_eq!(err.status(), Status::NotFound);
}

#[rstest]
fn given_unknown_line_when_adding_then_not_found(line_2: Fixture) {
    let err = line_2
        .container
        .lines
        .add_section(LineId(77), &SectionCreateRequest::new(line_2.yongsan, line_2.seongsu, 5))
        .unwrap_err();

    assert_eq!(err.status(), Status::NotFound);
}

#[rstest]
#[case::duplicate(1, 2, 5)]
#[case::too_long(1, 3, 10)]
#[case::zero(2, 3, 0)]
#[case::disconnected(3, 4, 5)]
fn given_rejected_add_when_reading_line_then_line_is_unchanged(
    line_2: Fixture,
    #[case] up: u64,
    #[case] down: u64,
    #[case] distance: i64,
) {
    let before = line_2.container.lines.find_line(line_2.line).unwrap().body;

    assert!(line_2.add(StationId(up), StationId(down), distance).is_err());

    let after = line_2.container.lines.find_line(line_2.line).unwrap().body;
    assert_eq!(after, before);
}

// ============================================================
// Section removal
// ============================================================

#[rstest]
fn given_two_sections_when_removing_down_terminal_then_no_content(line_2: Fixture) {
    line_2.add(line_2.yongsan, line_2.kondae, 5).unwrap();

    let status = line_2.remove(line_2.kondae).unwrap();

    assert_eq!(status, Status::NoContent);
    assert_eq!(line_2.station_ids(), vec![line_2.jamsil, line_2.yongsan]);
}

#[rstest]
fn given_three_sections_when_removing_middle_station_then_neighbours_are_joined(
    line_2: Fixture,
) {
    line_2.add(line_2.yongsan, line_2.kondae, 5).unwrap();
    line_2.add(line_2.kondae, line_2.seongsu, 5).unwrap();

    let status = line_2.remove(line_2.kondae).unwrap();

    assert_eq!(status, Status::NoContent);
    assert_eq!(
        line_2.station_ids(),
        vec![line_2.jamsil, line_2.yongsan, line_2.seongsu]
    );
    let line = line_2.container.lines.find_line(line_2.line).unwrap().body;
    assert_eq!(line.total_distance(), 20);
}

#[rstest]
fn given_two_sections_when_removing_up_terminal_then_next_station_leads(line_2: Fixture) {
    line_2.add(line_2.yongsan, line_2.kondae, 5).unwrap();

    line_2.remove(line_2.jamsil).unwrap();

    assert_eq!(line_2.station_ids().first(), Some(&line_2.yongsan));
}

#[rstest]
fn given_single_section_when_removing_then_bad_request_with_message(line_2: Fixture) {
    let err = line_2.remove(line_2.jamsil).unwrap_err();

    assert_eq!(err.status(), Status::BadRequest);
    assert_eq!(err.to_string(), "구간이 1개인 노선의 구간은 삭제할 수 없습니다.");
}

#[rstest]
fn given_station_not_on_line_when_removing_then_bad_request_with_message(line_2: Fixture) {
    line_2.add(line_2.yongsan, line_2.kondae, 5).unwrap();

    let err = line_2.remove(line_2.seongsu).unwrap_err();

    assert_eq!(err.status(), Status::BadRequest);
    assert_eq!(err.to_string(), "노선에 존재하지 않는 역은 삭제할 수 없습니다.");
}

// ============================================================
// Line lifecycle
// ============================================================

#[rstest]
fn given_same_terminals_when_creating_line_then_bad_request(line_2: Fixture) {
    let err = line_2
        .container
        .lines
        .create_line(&LineCreateRequest {
            name: "순환선".into(),
            color: "blue".into(),
            up_station_id: line_2.seongsu,
            down_station_id: line_2.seongsu,
            distance: 3,
        })
        .unwrap_err();

    assert_eq!(err.status(), Status::BadRequest);
}

#[rstest]
fn given_zero_distance_when_creating_line_then_bad_request(line_2: Fixture) {
    let err = line_2
        .container
        .lines
        .create_line(&LineCreateRequest {
            name: "신분당선".into(),
            color: "red".into(),
            up_station_id: line_2.kondae,
            down_station_id: line_2.seongsu,
            distance: 0,
        })
        .unwrap_err();

    assert_eq!(err.to_string(), "구간의 거리는 0보다 커야 합니다.");
    assert_eq!(line_2.container.lines.find_all_lines().unwrap().body.len(), 1);
}

#[rstest]
fn given_line_when_updating_name_then_topology_is_kept(line_2: Fixture) {
    let response = line_2
        .container
        .lines
        .update_line(
            line_2.line,
            &LineUpdateRequest {
                name: Some("2호선 순환".into()),
                ..LineUpdateRequest::default()
            },
        )
        .unwrap();

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.body.name, "2호선 순환");
    assert_eq!(response.body.color, "green");
    assert_eq!(line_2.station_ids(), vec![line_2.jamsil, line_2.yongsan]);
}

#[rstest]
fn given_line_when_deleting_then_no_content_and_gone(line_2: Fixture) {
    let lines = &line_2.container.lines;

    assert_eq!(lines.delete_line(line_2.line).unwrap().status, Status::NoContent);

    let err = lines.find_line(line_2.line).unwrap_err();
    assert_eq!(err.status(), Status::NotFound);
    assert_eq!(lines.delete_line(line_2.line).unwrap_err().status(), Status::NotFound);
}

// ============================================================
// Stations
// ============================================================

#[rstest]
fn given_station_on_line_when_deleting_then_rejected(line_2: Fixture) {
    let err = line_2
        .container
        .stations
        .delete_station(line_2.jamsil)
        .unwrap_err();

    assert!(matches!(err, ApplicationError::StationInUse(_, id) if id == line_2.line));
    assert_eq!(err.status(), Status::BadRequest);
}

#[rstest]
fn given_unused_station_when_deleting_then_no_content(line_2: Fixture) {
    let stations = &line_2.container.stations;

    assert_eq!(
        stations.delete_station(line_2.seongsu).unwrap().status,
        Status::NoContent
    );
    assert_eq!(
        stations.find_station(line_2.seongsu).unwrap_err().status(),
        Status::NotFound
    );
    assert_eq!(stations.find_all_stations().unwrap().body.len(), 3);
}

#[rstest]
#[case("")]
#[case("   ")]
fn given_blank_name_when_creating_station_then_bad_request(line_2: Fixture, #[case] name: &str) {
    let err = line_2.container.stations.create_station(name).unwrap_err();
    assert_eq!(err.status(), Status::BadRequest);
}

// ============================================================
// Concurrency
// ============================================================

#[test]
fn given_concurrent_removals_on_one_line_when_done_then_chain_stays_consistent() {
    testing::init_test_setup();
    const N: u64 = 40;
    let container = Arc::new(ServiceContainer::in_memory(Settings::default()));
    let ids: Vec<StationId> = (0..=N)
        .map(|i| create_station(&container, &format!("역{i}")))
        .collect();
    let line = container
        .lines
        .create_line(&LineCreateRequest {
            name: "긴 노선".into(),
            color: "black".into(),
            up_station_id: ids[0],
            down_station_id: ids[1],
            distance: 1,
        })
        .unwrap()
        .body
        .id;
    for pair in ids[1..].windows(2) {
        container
            .lines
            .add_section(line, &SectionCreateRequest::new(pair[0], pair[1], 1))
            .unwrap();
    }

    let handles: Vec<_> = ids[1..N as usize]
        .chunks(5)
        .map(|chunk| {
            let container = Arc::clone(&container);
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for station in chunk {
                    container.lines.remove_section(line, station).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let response = container.lines.find_line(line).unwrap().body;
    assert_eq!(response.station_ids(), vec![ids[0], ids[N as usize]]);
    assert_eq!(response.total_distance(), N);
}

#[test]
fn given_concurrent_inserts_on_separate_lines_when_done_then_each_line_is_complete() {
    testing::init_test_setup();
    let container = Arc::new(ServiceContainer::in_memory(Settings::default()));
    let a = create_station(&container, "A");
    let b = create_station(&container, "B");

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let container = Arc::clone(&container);
            thread::spawn(move || {
                let line = container
                    .lines
                    .create_line(&LineCreateRequest {
                        name: format!("{n}호선"),
                        color: "gray".into(),
                        up_station_id: a,
                        down_station_id: b,
                        distance: 100,
                    })
                    .unwrap()
                    .body
                    .id;
                let mut last = b;
                for i in 0..10 {
                    let next = create_station(&container, &format!("{n}-{i}"));
                    container
                        .lines
                        .add_section(line, &SectionCreateRequest::new(last, next, 2))
                        .unwrap();
                    last = next;
                }
                line
            })
        })
        .collect();

    for handle in handles {
        let line = handle.join().unwrap();
        let response = container.lines.find_line(line).unwrap().body;
        assert_eq!(response.stations.len(), 12);
        assert_eq!(response.total_distance(), 120);
    }
}
