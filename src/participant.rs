//! Chat participants and their rights.

use serde::{Deserialize, Serialize};

/// Minimal user record attached to a participant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub premium: bool,
}

/// Administrator permissions in a chat or channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ChatAdminRights {
    pub change_info: bool,
    pub post_messages: bool,
    pub edit_messages: bool,
    pub delete_messages: bool,
    pub ban_users: bool,
    pub invite_users: bool,
    pub pin_messages: bool,
    pub add_admins: bool,
    pub anonymous: bool,
    pub manage_call: bool,
    pub other: bool,
    pub manage_topics: bool,
}

impl ChatAdminRights {
    #[must_use]
    pub const fn can_change_info(&self) -> bool {
        self.change_info
    }

    #[must_use]
    pub const fn can_post_messages(&self) -> bool {
        self.post_messages
    }

    #[must_use]
    pub const fn can_edit_messages(&self) -> bool {
        self.edit_messages
    }

    #[must_use]
    pub const fn can_delete_messages(&self) -> bool {
        self.delete_messages
    }

    #[must_use]
    pub const fn can_ban_users(&self) -> bool {
        self.ban_users
    }

    #[must_use]
    pub const fn can_invite_users(&self) -> bool {
        self.invite_users
    }

    #[must_use]
    pub const fn can_pin_messages(&self) -> bool {
        self.pin_messages
    }

    /// Whether this admin may appoint other admins.
    #[must_use]
    pub const fn can_promote_members(&self) -> bool {
        self.add_admins
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    #[must_use]
    pub const fn can_manage_call(&self) -> bool {
        self.manage_call
    }
}

/// Restrictions placed on a member. Each `true` field denies that permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ChatBannedRights {
    pub view_messages: bool,
    pub send_messages: bool,
    pub send_media: bool,
    pub send_stickers: bool,
    pub send_gifs: bool,
    pub send_games: bool,
    pub send_inline: bool,
    pub embed_links: bool,
    pub send_polls: bool,
    pub change_info: bool,
    pub invite_users: bool,
    pub pin_messages: bool,
    /// Unix time the restriction lifts; 0 means forever.
    pub until_date: i32,
}

impl ChatBannedRights {
    /// Rights that kick the user out entirely.
    #[must_use]
    pub const fn banned() -> Self {
        Self {
            view_messages: true,
            send_messages: true,
            send_media: true,
            send_stickers: true,
            send_gifs: true,
            send_games: true,
            send_inline: true,
            embed_links: true,
            send_polls: true,
            change_info: true,
            invite_users: true,
            pin_messages: true,
            until_date: 0,
        }
    }

    /// Rights that keep the user in the chat but read-only.
    #[must_use]
    pub const fn muted() -> Self {
        Self {
            view_messages: false,
            ..Self::banned()
        }
    }
}

/// A member's role in a channel or supergroup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChannelParticipant {
    Creator {
        user_id: i64,
        #[serde(default)]
        rank: String,
        #[serde(default)]
        rights: ChatAdminRights,
    },
    Admin {
        user_id: i64,
        #[serde(default)]
        rank: String,
        #[serde(default)]
        rights: ChatAdminRights,
        promoted_by: i64,
        #[serde(default)]
        can_edit: bool,
    },
    Member {
        user_id: i64,
        #[serde(default)]
        date: i32,
    },
    /// The logged-in account as a regular member.
    SelfMember {
        user_id: i64,
        #[serde(default)]
        inviter_id: Option<i64>,
    },
    Banned {
        peer_id: i64,
        kicked_by: i64,
        #[serde(default)]
        rights: ChatBannedRights,
    },
    Left {
        peer_id: i64,
    },
}

impl ChannelParticipant {
    /// The admin title shown next to creators and admins.
    #[must_use]
    pub fn rank(&self) -> &str {
        match self {
            Self::Creator { rank, .. } | Self::Admin { rank, .. } => rank,
            Self::Member { .. }
            | Self::SelfMember { .. }
            | Self::Banned { .. }
            | Self::Left { .. } => "",
        }
    }

    #[must_use]
    pub const fn admin_rights(&self) -> Option<&ChatAdminRights> {
        match self {
            Self::Creator { rights, .. } | Self::Admin { rights, .. } => Some(rights),
            _ => None,
        }
    }
}

/// A participant together with flags derived from its role.
///
/// The flags and `rights` always follow `participant`: when deserializing,
/// only `user` and `participant` are read and everything else is recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ParticipantRecord")]
#[allow(clippy::struct_excessive_bools)]
pub struct Participant {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    admin: bool,
    banned: bool,
    creator: bool,
    left: bool,
    participant: ChannelParticipant,
    #[serde(skip_serializing_if = "Option::is_none")]
    rights: Option<ChatAdminRights>,
}

/// Wire form of a [`Participant`] before its flags are derived.
#[derive(Deserialize)]
struct ParticipantRecord {
    #[serde(default)]
    user: Option<User>,
    participant: ChannelParticipant,
}

impl From<ParticipantRecord> for Participant {
    fn from(record: ParticipantRecord) -> Self {
        Self::from_channel_participant(record.user, record.participant)
    }
}

impl Participant {
    /// Builds a participant, deriving the status flags from `participant`.
    #[must_use]
    pub fn from_channel_participant(user: Option<User>, participant: ChannelParticipant) -> Self {
        let (admin, banned, creator, left) = match &participant {
            ChannelParticipant::Creator { .. } => (true, false, true, false),
            ChannelParticipant::Admin { .. } => (true, false, false, false),
            ChannelParticipant::Banned { .. } => (false, true, false, false),
            ChannelParticipant::Left { .. } => (false, false, false, true),
            ChannelParticipant::Member { .. } | ChannelParticipant::SelfMember { .. } => {
                (false, false, false, false)
            }
        };

        Self {
            user,
            admin,
            banned,
            creator,
            left,
            rights: participant.admin_rights().copied(),
            participant,
        }
    }

    #[must_use]
    pub const fn is_creator(&self) -> bool {
        self.creator
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.admin
    }

    #[must_use]
    pub const fn is_banned(&self) -> bool {
        self.banned
    }

    #[must_use]
    pub const fn is_left(&self) -> bool {
        self.left
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn participant(&self) -> &ChannelParticipant {
        &self.participant
    }

    /// Admin rights of a creator or admin.
    #[must_use]
    pub const fn rights(&self) -> Option<&ChatAdminRights> {
        self.rights.as_ref()
    }

    /// Rank of a creator or admin; empty for every other role.
    #[must_use]
    pub fn rank(&self) -> &str {
        self.participant.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(rank: &str) -> ChannelParticipant {
        ChannelParticipant::Creator {
            user_id: 1,
            rank: rank.to_owned(),
            rights: ChatAdminRights {
                add_admins: true,
                ..ChatAdminRights::default()
            },
        }
    }

    #[test]
    fn test_rank_for_creator() {
        let p = Participant::from_channel_participant(None, creator("Owner"));
        assert_eq!(p.rank(), "Owner");
        assert!(p.is_creator());
        assert!(p.is_admin());
        assert!(p.rights.is_some_and(|r| r.can_promote_members()));
    }

    #[test]
    fn test_rank_for_admin() {
        let p = Participant::from_channel_participant(
            None,
            ChannelParticipant::Admin {
                user_id: 2,
                rank: "Moderator".to_owned(),
                rights: ChatAdminRights::default(),
                promoted_by: 1,
                can_edit: true,
            },
        );
        assert_eq!(p.rank(), "Moderator");
        assert!(p.is_admin());
        assert!(!p.is_creator());
    }

    #[test]
    fn test_rank_for_banned_is_empty() {
        let p = Participant::from_channel_participant(
            Some(User {
                id: 3,
                first_name: "Spam".to_owned(),
                ..User::default()
            }),
            ChannelParticipant::Banned {
                peer_id: 3,
                kicked_by: 1,
                rights: ChatBannedRights::banned(),
            },
        );
        assert_eq!(p.rank(), "");
        assert!(p.is_banned());
        assert!(!p.is_admin());
        assert!(p.rights.is_none());
        assert_eq!(p.user().map(|u| u.id), Some(3));
    }

    #[test]
    fn test_left_and_member() {
        let left = Participant::from_channel_participant(None, ChannelParticipant::Left { peer_id: 4 });
        assert!(left.is_left());
        assert_eq!(left.rank(), "");

        let member = Participant::from_channel_participant(
            None,
            ChannelParticipant::Member { user_id: 5, date: 0 },
        );
        assert!(!member.is_admin() && !member.is_banned() && !member.is_left());
    }

    #[test]
    fn test_admin_rights_accessors() {
        let rights = ChatAdminRights {
            change_info: true,
            delete_messages: true,
            manage_call: true,
            ..ChatAdminRights::default()
        };
        assert!(rights.can_change_info());
        assert!(rights.can_delete_messages());
        assert!(rights.can_manage_call());
        assert!(!rights.can_ban_users());
        assert!(!rights.is_anonymous());
    }

    #[test]
    fn test_muted_keeps_view() {
        let muted = ChatBannedRights::muted();
        assert!(!muted.view_messages);
        assert!(muted.send_messages);
    }

    #[test]
    fn test_participant_deserialize() {
        let json = r#"{"participant":{"role":"creator","user_id":9,"rank":"Boss"}}"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(p.rank(), "Boss");
        assert!(p.is_creator());
        assert!(p.is_admin());
        assert!(p.rights().is_some());
    }

    #[test]
    fn test_deserialize_ignores_stored_flags() {
        let json = r#"{
            "participant": {"role": "member", "user_id": 5, "date": 0},
            "creator": true,
            "admin": true,
            "banned": true,
            "rights": {"add_admins": true}
        }"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert!(!p.is_creator());
        assert!(!p.is_admin());
        assert!(!p.is_banned());
        assert!(p.rights().is_none());

        let round = serde_json::to_value(&p).unwrap();
        assert_eq!(round["creator"], false);
        assert_eq!(round["admin"], false);
    }
}
